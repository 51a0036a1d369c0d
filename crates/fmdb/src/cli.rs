//! Clap derive structures for the `fmdb` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fmdb -- buildings, rooms and devices in the facility document store
#[derive(Debug, Parser)]
#[command(
    name = "fmdb",
    version,
    about = "Manage the facility hierarchy from the command line",
    long_about = "Browse and edit buildings, rooms, devices and device types.\n\n\
        Every write checks that the documents it refers to exist, and renames\n\
        carry rooms and devices along to the new ID.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Store profile to use
    #[arg(long, short = 'p', env = "FMDB_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Store URL (overrides profile)
    #[arg(long, short = 'a', env = "FMDB_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Store username (overrides profile)
    #[arg(long, short = 'u', env = "FMDB_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FMDB_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FMDB_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FMDB_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one ID per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage buildings
    #[command(alias = "b")]
    Buildings(BuildingsArgs),

    /// Manage rooms
    #[command(alias = "r")]
    Rooms(RoomsArgs),

    /// Manage devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Inspect device types
    #[command(alias = "types")]
    DeviceTypes(DeviceTypesArgs),

    /// Inspect the CLI configuration
    Config(ConfigArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BUILDINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BuildingsArgs {
    #[command(subcommand)]
    pub command: BuildingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BuildingsCommand {
    /// List all buildings
    #[command(alias = "ls")]
    List,

    /// Show one building
    Get { id: String },

    /// Create a building
    Create {
        /// Building ID (e.g., "ITB")
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Rename a building, moving its rooms and devices
    #[command(alias = "mv")]
    Rename { id: String, new_id: String },

    /// Delete a building that has no rooms
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROOMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoomsCommand {
    /// List rooms, optionally only those in one building
    #[command(alias = "ls")]
    List {
        #[arg(long, short = 'b')]
        building: Option<String>,
    },

    /// Show one room
    Get { id: String },

    /// Create a room in an existing building
    Create {
        /// Room ID (e.g., "ITB-1101")
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Deployment designation (e.g., "production")
        #[arg(long, default_value = "")]
        designation: String,

        /// Room configuration ID
        #[arg(long)]
        configuration: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Rename a room, moving its devices
    #[command(alias = "mv")]
    Rename { id: String, new_id: String },

    /// Delete a room that has no devices
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(DeviceFilter),

    /// Show one device with its type resolved
    Get { id: String },

    /// Create a device from a JSON document
    Create {
        /// Path to the device JSON
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct DeviceFilter {
    /// Only devices in this room
    #[arg(long, short = 'r')]
    pub room: Option<String>,

    /// Only devices holding this role (case-insensitive)
    #[arg(long)]
    pub role: Option<String>,

    /// Only devices of this type (case-insensitive)
    #[arg(long = "type", short = 't')]
    pub device_type: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICE TYPES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceTypesArgs {
    #[command(subcommand)]
    pub command: DeviceTypesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceTypesCommand {
    /// List device types
    #[command(alias = "ls")]
    List,

    /// Show one device type
    Get { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration with secrets masked
    Show,

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}
