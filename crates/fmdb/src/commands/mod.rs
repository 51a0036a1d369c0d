//! Command dispatch: bridges CLI args -> facility calls -> output formatting.

pub mod buildings;
pub mod config_cmd;
pub mod device_types;
pub mod devices;
pub mod rooms;
pub mod util;

use fmdb_core::Facility;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    facility: &Facility,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Buildings(args) => buildings::handle(facility, args, global).await,
        Command::Rooms(args) => rooms::handle(facility, args, global).await,
        Command::Devices(args) => devices::handle(facility, args, global).await,
        Command::DeviceTypes(args) => device_types::handle(facility, args, global).await,
        // Handled before a facility is built
        Command::Config(args) => config_cmd::handle(args, global),
    }
}
