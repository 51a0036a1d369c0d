//! Device command handlers.

use tabled::Tabled;

use fmdb_core::{Device, Facility, QueryResult};

use crate::cli::{DeviceFilter, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: display_name(d),
            device_type: d.device_type.id.clone(),
            roles: role_list(d),
            address: d.address.clone(),
        }
    }
}

fn display_name(d: &Device) -> String {
    if d.display_name.is_empty() {
        d.name.clone()
    } else {
        d.display_name.clone()
    }
}

fn role_list(d: &Device) -> String {
    d.roles
        .iter()
        .map(|r| r.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn detail(d: &Device) -> String {
    let ports = d
        .ports
        .iter()
        .map(|p| {
            let from = p.source_device.as_deref().unwrap_or("-");
            let to = p.destination_device.as_deref().unwrap_or("-");
            format!("{} ({from} -> {to})", p.id)
        })
        .collect::<Vec<_>>()
        .join(", ");

    output::detail(&[
        ("ID", d.id.clone()),
        ("Name", d.name.clone()),
        ("Display Name", d.display_name.clone()),
        ("Description", d.description.clone()),
        ("Address", d.address.clone()),
        ("Type", d.device_type.id.clone()),
        ("Type Info", d.device_type.description.clone()),
        ("Roles", role_list(d)),
        ("Ports", ports),
        ("Tags", d.tags.join(", ")),
    ])
}

// ── Listing ─────────────────────────────────────────────────────────

/// Pick the narrowest query the filter allows, then apply what is left.
async fn list(facility: &Facility, filter: &DeviceFilter) -> Result<QueryResult<Device>, CliError> {
    let result = match (&filter.room, &filter.role, &filter.device_type) {
        (Some(room), Some(role), _) => facility.devices_in_room_with_role(room, role).await?,
        (Some(room), None, _) => facility.devices_in_room(room).await?,
        (None, Some(role), Some(type_id)) => facility.devices_by_role_and_type(role, type_id).await?,
        (None, Some(role), None) => facility.list_devices().await?.filter(|d| d.has_role(role)),
        (None, None, _) => facility.list_devices().await?,
    };

    Ok(match (&filter.room, &filter.role, &filter.device_type) {
        (Some(_), _, Some(type_id)) | (None, None, Some(type_id)) => {
            result.filter(|d| d.is_type(type_id))
        }
        _ => result,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    facility: &Facility,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(filter) => {
            let result = list(facility, &filter).await?;
            util::warn_if_truncated(&result, global.quiet);
            let out = output::render_list(
                &global.output,
                &result.docs,
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = facility.get_device(&id).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Create { from_file } => {
            let device: Device = util::read_json_file(&from_file)?;
            let created = facility.create_device(&device).await?;
            if !global.quiet {
                eprintln!("Device {} created", created.id);
            }
            Ok(())
        }

        DevicesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete device '{id}'?"), "devices delete", global.yes)? {
                return Ok(());
            }
            facility.delete_device(&id).await?;
            if !global.quiet {
                eprintln!("Device {id} deleted");
            }
            Ok(())
        }
    }
}
