use thiserror::Error;

/// Top-level error type for the `fmdb-api` crate.
///
/// Store-level variants mirror the `{error, reason}` bodies the document store
/// returns on failure. Transport variants cover everything that happens before
/// the store gets to answer. `fmdb-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Store errors ────────────────────────────────────────────────
    /// The requested document or database does not exist.
    #[error("document not found: {reason}")]
    NotFound { reason: String },

    /// Revision mismatch on update/delete, or a duplicate ID on create.
    #[error("document conflict: {reason}")]
    Conflict { reason: String },

    /// The store rejected a malformed document or query.
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// The store answered with an error kind this client does not know.
    #[error("unknown store error '{error}': {reason}")]
    UnknownStore { error: String, reason: String },

    /// Non-2xx response whose body is not a store error payload.
    #[error("unexpected HTTP {status} from document store: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for document paths: {0}")]
    UnsupportedBaseUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a store error payload by its `error` field.
    pub fn from_store(error: &str, reason: String) -> Self {
        match error.to_ascii_lowercase().as_str() {
            "not_found" => Self::NotFound { reason },
            "conflict" => Self::Conflict { reason },
            "bad_request" => Self::BadRequest { reason },
            _ => Self::UnknownStore {
                error: error.to_owned(),
                reason,
            },
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` for revision mismatches and duplicate IDs.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_store_errors() {
        assert!(matches!(
            Error::from_store("not_found", "missing".into()),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            Error::from_store("CONFLICT", "Document update conflict.".into()),
            Error::Conflict { .. }
        ));
        assert!(matches!(
            Error::from_store("bad_request", "invalid UTF-8 JSON".into()),
            Error::BadRequest { .. }
        ));
    }

    #[test]
    fn unknown_store_error_keeps_kind() {
        let err = Error::from_store("forbidden", "no".into());
        match err {
            Error::UnknownStore { error, reason } => {
                assert_eq!(error, "forbidden");
                assert_eq!(reason, "no");
            }
            other => panic!("expected UnknownStore, got {other:?}"),
        }
    }
}
