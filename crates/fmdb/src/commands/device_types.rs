//! Device type command handlers.

use tabled::Tabled;

use fmdb_core::{DeviceType, Facility};

use crate::cli::{DeviceTypesArgs, DeviceTypesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DeviceTypeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Roles")]
    roles: usize,
    #[tabled(rename = "Ports")]
    ports: usize,
    #[tabled(rename = "Commands")]
    commands: usize,
}

impl From<&DeviceType> for DeviceTypeRow {
    fn from(t: &DeviceType) -> Self {
        Self {
            id: t.id.clone(),
            description: t.description.clone(),
            roles: t.roles.len(),
            ports: t.ports.len(),
            commands: t.commands.len(),
        }
    }
}

fn detail(t: &DeviceType) -> String {
    let flags = [
        ("input", t.input),
        ("output", t.output),
        ("source", t.source),
        ("destination", t.destination),
    ]
    .iter()
    .filter(|(_, set)| *set)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>()
    .join(", ");

    output::detail(&[
        ("ID", t.id.clone()),
        ("Display Name", t.display_name.clone()),
        ("Description", t.description.clone()),
        ("Flags", flags),
        (
            "Roles",
            t.roles.iter().map(|r| r.id.as_str()).collect::<Vec<_>>().join(", "),
        ),
        (
            "Ports",
            t.ports.iter().map(|p| p.id.as_str()).collect::<Vec<_>>().join(", "),
        ),
        (
            "Commands",
            t.commands.iter().map(|c| c.id.as_str()).collect::<Vec<_>>().join(", "),
        ),
        (
            "Power States",
            t.power_states
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        ("Tags", t.tags.join(", ")),
    ])
}

pub async fn handle(
    facility: &Facility,
    args: DeviceTypesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DeviceTypesCommand::List => {
            let result = facility.list_device_types().await?;
            util::warn_if_truncated(&result, global.quiet);
            let out = output::render_list(
                &global.output,
                &result.docs,
                |t| DeviceTypeRow::from(t),
                |t| t.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeviceTypesCommand::Get { id } => {
            let device_type = facility.get_device_type(&id).await?;
            let out =
                output::render_single(&global.output, &device_type, detail, |t| t.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
