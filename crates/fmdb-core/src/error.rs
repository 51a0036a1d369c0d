// ── Core error types ──
//
// Domain errors from fmdb-core. Consumers never see HTTP status codes or
// raw store payloads: `CoreError::store` translates gateway errors into
// domain variants and attaches the entity, ID, and operation involved.

use strum::Display;
use thiserror::Error;

use crate::model::EntityKind;

/// What the engine was doing when a store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Connect,
    Get,
    Create,
    Update,
    Delete,
    Query,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    /// A referenced document (parent room/building, port device) is absent.
    #[error("cannot write {entity} {id}: {missing} {missing_id} does not exist")]
    MissingReference {
        entity: EntityKind,
        id: String,
        missing: EntityKind,
        missing_id: String,
    },

    // ── Write errors ─────────────────────────────────────────────────
    /// Duplicate ID on create, or stale revision token on update/delete.
    #[error("conflict writing {entity} {id}: {reason}")]
    Conflict {
        entity: EntityKind,
        id: String,
        reason: String,
    },

    #[error("invalid {entity}: {message}")]
    ValidationFailed { entity: EntityKind, message: String },

    /// A delete guard found children that must be removed first.
    #[error("cannot delete {entity} {id}: still has {} ({})", .blocking.len(), .blocking.join(", "))]
    PreconditionFailed {
        entity: EntityKind,
        id: String,
        blocking: Vec<String>,
    },

    /// A rename finished but some children could not be moved.
    #[error("renamed {entity} {from} to {to}, but {} children failed to move: {}", .failed.len(), .failed.join(", "))]
    CascadeIncomplete {
        entity: EntityKind,
        from: String,
        to: String,
        failed: Vec<String>,
    },

    // ── Store errors (wrapped, not exposed raw) ──────────────────────
    #[error("store rejected {operation} of {entity}: {reason}")]
    BadRequest {
        entity: EntityKind,
        operation: Operation,
        reason: String,
    },

    #[error("unrecognised store error during {operation} of {entity}: {message}")]
    UnknownStore {
        entity: EntityKind,
        operation: Operation,
        message: String,
    },

    // ── Transport errors ─────────────────────────────────────────────
    #[error("cannot reach document store during {operation}: {message}")]
    Transport { operation: Operation, message: String },

    #[error("document store request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Translate a gateway error, attaching what was being done to what.
    pub fn store(
        err: fmdb_api::Error,
        entity: EntityKind,
        id: &str,
        operation: Operation,
    ) -> Self {
        match err {
            fmdb_api::Error::NotFound { .. } => CoreError::NotFound {
                entity,
                id: id.to_owned(),
            },
            fmdb_api::Error::Conflict { reason } => CoreError::Conflict {
                entity,
                id: id.to_owned(),
                reason,
            },
            fmdb_api::Error::BadRequest { reason } => CoreError::BadRequest {
                entity,
                operation,
                reason,
            },
            fmdb_api::Error::UnknownStore { error, reason } => CoreError::UnknownStore {
                entity,
                operation,
                message: format!("{error}: {reason}"),
            },
            fmdb_api::Error::UnexpectedStatus { status, body } => CoreError::UnknownStore {
                entity,
                operation,
                message: format!("HTTP {status}: {body}"),
            },
            fmdb_api::Error::Transport(e) => CoreError::Transport {
                operation,
                message: e.to_string(),
            },
            fmdb_api::Error::Tls(msg) => CoreError::Transport {
                operation,
                message: format!("TLS error: {msg}"),
            },
            other => CoreError::from(other),
        }
    }

    /// `NotFound`, or a write that failed because a reference is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MissingReference { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    pub(crate) fn invalid(entity: EntityKind, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            entity,
            message: message.into(),
        }
    }
}

// ── Conversion from gateway errors without document context ──────────

impl From<fmdb_api::Error> for CoreError {
    fn from(err: fmdb_api::Error) -> Self {
        match err {
            fmdb_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            fmdb_api::Error::Transport(e) => CoreError::Transport {
                operation: Operation::Connect,
                message: e.to_string(),
            },
            fmdb_api::Error::Tls(msg) => CoreError::Transport {
                operation: Operation::Connect,
                message: format!("TLS error: {msg}"),
            },
            fmdb_api::Error::UnsupportedBaseUrl(url) => CoreError::Config {
                message: format!("store URL cannot carry document paths: {url}"),
            },
            fmdb_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            fmdb_api::Error::NotFound { reason }
            | fmdb_api::Error::Conflict { reason }
            | fmdb_api::Error::BadRequest { reason } => CoreError::Internal(reason),
            fmdb_api::Error::UnknownStore { error, reason } => {
                CoreError::Internal(format!("{error}: {reason}"))
            }
            fmdb_api::Error::UnexpectedStatus { status, body } => {
                CoreError::Internal(format!("HTTP {status}: {body}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_carry_context() {
        let err = CoreError::store(
            fmdb_api::Error::Conflict {
                reason: "Document update conflict.".into(),
            },
            EntityKind::Room,
            "ITB-1101",
            Operation::Update,
        );
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "conflict writing room ITB-1101: Document update conflict."
        );
    }

    #[test]
    fn precondition_lists_blockers() {
        let err = CoreError::PreconditionFailed {
            entity: EntityKind::Building,
            id: "ITB".into(),
            blocking: vec!["ITB-1101".into(), "ITB-1108".into()],
        };
        assert_eq!(
            err.to_string(),
            "cannot delete building ITB: still has 2 (ITB-1101, ITB-1108)"
        );
    }

    #[test]
    fn timeout_stays_distinct_from_store_errors() {
        let err = CoreError::store(
            fmdb_api::Error::Timeout { timeout_secs: 30 },
            EntityKind::Device,
            "ITB-1101-CP1",
            Operation::Get,
        );
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 30 }));
        assert!(!err.is_not_found());
    }
}
