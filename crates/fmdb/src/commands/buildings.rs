//! Building command handlers.

use tabled::Tabled;

use fmdb_core::{Building, Facility};

use crate::cli::{BuildingsArgs, BuildingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BuildingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Building> for BuildingRow {
    fn from(b: &Building) -> Self {
        Self {
            id: b.id.clone(),
            name: b.name.clone(),
            description: b.description.clone(),
        }
    }
}

fn detail(b: &Building) -> String {
    output::detail(&[
        ("ID", b.id.clone()),
        ("Name", b.name.clone()),
        ("Description", b.description.clone()),
        ("Tags", b.tags.join(", ")),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    facility: &Facility,
    args: BuildingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BuildingsCommand::List => {
            let result = facility.list_buildings().await?;
            util::warn_if_truncated(&result, global.quiet);
            let out = output::render_list(
                &global.output,
                &result.docs,
                |b| BuildingRow::from(b),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BuildingsCommand::Get { id } => {
            let building = facility.get_building(&id).await?;
            let out = output::render_single(&global.output, &building, detail, |b| b.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BuildingsCommand::Create {
            id,
            name,
            description,
            tags,
        } => {
            let building = Building {
                description,
                tags,
                ..Building::new(id, name)
            };
            let created = facility.create_building(&building).await?;
            if !global.quiet {
                eprintln!("Building {} created", created.id);
            }
            Ok(())
        }

        BuildingsCommand::Rename { id, new_id } => {
            let existing = facility.get_building(&id).await?;
            let target = Building {
                id: new_id,
                rev: None,
                ..existing
            };
            let renamed = facility.rename_building(&id, &target).await?;
            if !global.quiet {
                eprintln!("Building {id} renamed to {}", renamed.entity.id);
            }
            util::print_cascade(&renamed.cascade, global.quiet);
            renamed.into_result(&id)?;
            Ok(())
        }

        BuildingsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete building '{id}'?"),
                "buildings delete",
                global.yes,
            )? {
                return Ok(());
            }
            facility.delete_building(&id).await?;
            if !global.quiet {
                eprintln!("Building {id} deleted");
            }
            Ok(())
        }
    }
}
