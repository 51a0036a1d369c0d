//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fmdb_config::ConfigError;
use fmdb_core::{CoreError, EntityKind};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the document store")]
    #[diagnostic(
        code(fmdb::connection_failed),
        help(
            "Check that the store is running and the address is right.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(fmdb::timeout),
        help("Increase timeout with --timeout or check store responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(fmdb::no_credentials),
        help(
            "Store one with: fmdb config set-password --profile {profile}\n\
             Or set the FMDB_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fmdb::not_found),
        help("Run: fmdb {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' refers to {missing} '{missing_id}', which does not exist")]
    #[diagnostic(
        code(fmdb::missing_reference),
        help("Create the {missing} first, then retry.")
    )]
    MissingReference {
        resource_type: String,
        identifier: String,
        missing: String,
        missing_id: String,
    },

    #[error("Conflict writing {resource_type} '{identifier}': {reason}")]
    #[diagnostic(
        code(fmdb::conflict),
        help("The ID is taken or the document changed underneath you. Fetch it again and retry.")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
        reason: String,
    },

    #[error("{resource_type} '{identifier}' still contains: {children}")]
    #[diagnostic(
        code(fmdb::has_children),
        help("Delete or move the contents first.")
    )]
    HasChildren {
        resource_type: String,
        identifier: String,
        children: String,
    },

    #[error("Renamed {resource_type} '{from}' to '{to}', but some children did not move: {failed}")]
    #[diagnostic(
        code(fmdb::cascade_incomplete),
        help("The children listed still carry the old ID. Rename them individually.")
    )]
    CascadeIncomplete {
        resource_type: String,
        from: String,
        to: String,
        failed: String,
    },

    #[error("Document store error: {message}")]
    #[diagnostic(code(fmdb::store))]
    Store { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fmdb::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fmdb::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No document store configured")]
    #[diagnostic(
        code(fmdb::no_config),
        help(
            "Pass --address, set FMDB_ADDRESS (or DB_ADDRESS), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fmdb::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fmdb::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(fmdb::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::MissingReference { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::HasChildren { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// The `list` subcommand that shows entities of `kind`.
fn list_command(kind: EntityKind) -> String {
    match kind {
        EntityKind::Building => "buildings list",
        EntityKind::Room => "rooms list",
        EntityKind::Device => "devices list",
        EntityKind::DeviceType => "device-types list",
        EntityKind::RoomConfiguration | EntityKind::UiConfig => "rooms list",
    }
    .into()
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => CliError::NotFound {
                resource_type: entity.to_string(),
                identifier: id,
                list_command: list_command(entity),
            },

            CoreError::MissingReference {
                entity,
                id,
                missing,
                missing_id,
            } => CliError::MissingReference {
                resource_type: entity.to_string(),
                identifier: id,
                missing: missing.to_string(),
                missing_id,
            },

            CoreError::Conflict { entity, id, reason } => CliError::Conflict {
                resource_type: entity.to_string(),
                identifier: id,
                reason,
            },

            CoreError::ValidationFailed { entity, message } => CliError::Validation {
                field: entity.to_string(),
                reason: message,
            },

            CoreError::PreconditionFailed {
                entity,
                id,
                blocking,
            } => CliError::HasChildren {
                resource_type: entity.to_string(),
                identifier: id,
                children: blocking.join(", "),
            },

            CoreError::CascadeIncomplete {
                entity,
                from,
                to,
                failed,
            } => CliError::CascadeIncomplete {
                resource_type: entity.to_string(),
                from,
                to,
                failed: failed.join(", "),
            },

            CoreError::Transport { message, .. } => CliError::ConnectionFailed { reason: message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            other @ (CoreError::BadRequest { .. }
            | CoreError::UnknownStore { .. }
            | CoreError::Internal(_)) => CliError::Store {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
