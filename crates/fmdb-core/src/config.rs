// ── Runtime store configuration ──
//
// These types describe *how* to reach the document store and how the
// consistency engine should behave. They carry credential data and tuning,
// but never touch disk: the CLI (via fmdb-config) builds a `StoreConfig`
// and hands it to `Facility::new`.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::identifier::IdSchema;

/// Page size for hierarchy-scoped queries (children of one parent).
pub const DEFAULT_FIND_LIMIT: usize = 1000;
/// Page size for whole-collection device listings.
pub const DEFAULT_BULK_LIMIT: usize = 5000;
/// Concurrent child renames during a cascade.
pub const DEFAULT_CASCADE_CONCURRENCY: usize = 4;

/// Basic credentials for the store. Absent credentials mean
/// unauthenticated requests.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development stores).
    DangerAcceptInvalid,
}

/// What device listings do with a device whose DeviceType reference does
/// not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTypePolicy {
    /// Drop the device from the listing and log a warning.
    #[default]
    Omit,
    /// Fail the whole listing with `NotFound`.
    Fail,
}

/// Configuration for one document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store root URL (e.g., `https://couch.example.edu:6984`).
    pub url: Url,
    pub credentials: Option<StoreCredentials>,
    pub tls: TlsVerification,
    /// Deadline for every individual HTTP call.
    pub timeout: Duration,
    /// Limit for prefix (children-of) queries.
    pub find_limit: usize,
    /// Limit for bulk listings.
    pub bulk_limit: usize,
    /// Upper bound on concurrently running cascade children.
    pub cascade_concurrency: usize,
    pub missing_types: MissingTypePolicy,
    /// Delimiter and segment rules for hierarchical IDs.
    pub schema: IdSchema,
}

impl StoreConfig {
    /// A config pointing at `url` with every other knob at its default.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            find_limit: DEFAULT_FIND_LIMIT,
            bulk_limit: DEFAULT_BULK_LIMIT,
            cascade_concurrency: DEFAULT_CASCADE_CONCURRENCY,
            missing_types: MissingTypePolicy::default(),
            schema: IdSchema::default(),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.credentials = Some(StoreCredentials {
            username: username.into(),
            password,
        });
        self
    }
}
