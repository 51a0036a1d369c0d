//! Room command handlers.

use tabled::Tabled;

use fmdb_core::{DocumentRef, Facility, Room};

use crate::cli::{GlobalOpts, RoomsArgs, RoomsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Designation")]
    designation: String,
    #[tabled(rename = "Configuration")]
    configuration: String,
}

impl From<&Room> for RoomRow {
    fn from(r: &Room) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            designation: r.designation.clone(),
            configuration: configuration_id(r),
        }
    }
}

fn configuration_id(r: &Room) -> String {
    r.configuration
        .as_ref()
        .map(|c| c.id.clone())
        .unwrap_or_default()
}

fn detail(r: &Room) -> String {
    output::detail(&[
        ("ID", r.id.clone()),
        ("Name", r.name.clone()),
        ("Description", r.description.clone()),
        ("Designation", r.designation.clone()),
        ("Configuration", configuration_id(r)),
        ("Tags", r.tags.join(", ")),
    ])
}

pub async fn handle(facility: &Facility, args: RoomsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RoomsCommand::List { building } => {
            let result = match building {
                Some(building) => facility.rooms_in_building(&building).await?,
                None => facility.list_rooms().await?,
            };
            util::warn_if_truncated(&result, global.quiet);
            let out = output::render_list(
                &global.output,
                &result.docs,
                |r| RoomRow::from(r),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoomsCommand::Get { id } => {
            let room = facility.get_room(&id).await?;
            let out = output::render_single(&global.output, &room, detail, |r| r.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoomsCommand::Create {
            id,
            name,
            description,
            designation,
            configuration,
            tags,
        } => {
            let room = Room {
                description,
                designation,
                configuration: configuration.map(|id| DocumentRef { id }),
                tags,
                ..Room::new(id, name)
            };
            let created = facility.create_room(&room).await?;
            if !global.quiet {
                eprintln!("Room {} created", created.id);
            }
            Ok(())
        }

        RoomsCommand::Rename { id, new_id } => {
            let existing = facility.get_room(&id).await?;
            let target = Room {
                id: new_id,
                rev: None,
                ..existing
            };
            let renamed = facility.rename_room(&id, &target).await?;
            if !global.quiet {
                eprintln!("Room {id} renamed to {}", renamed.entity.id);
            }
            util::print_cascade(&renamed.cascade, global.quiet);
            renamed.into_result(&id)?;
            Ok(())
        }

        RoomsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete room '{id}'?"), "rooms delete", global.yes)? {
                return Ok(());
            }
            facility.delete_room(&id).await?;
            if !global.quiet {
                eprintln!("Room {id} deleted");
            }
            Ok(())
        }
    }
}
