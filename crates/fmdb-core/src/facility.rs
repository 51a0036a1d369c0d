// ── Facility handle ──
//
// The one entry point consumers hold. It owns the store client, the ID
// schema, the runtime configuration and the event publisher; the
// repository, query and cascade modules add their operations to it through
// separate `impl Facility` blocks.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use fmdb_api::transport::{TlsMode, TransportConfig};
use fmdb_api::{BasicAuth, StoreClient};

use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;
use crate::identifier::IdSchema;
use crate::model::EntityKind;
use crate::notify::{ChangeKind, EventPublisher, NoopPublisher, event_type};

/// Cheaply cloneable via `Arc<FacilityInner>`; clones share one HTTP
/// connection pool.
#[derive(Clone)]
pub struct Facility {
    inner: Arc<FacilityInner>,
}

struct FacilityInner {
    client: StoreClient,
    config: StoreConfig,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facility")
            .field("url", &self.inner.config.url.as_str())
            .field("schema", &self.inner.config.schema)
            .finish_non_exhaustive()
    }
}

impl Facility {
    /// Build a facility that publishes nowhere. No network traffic happens
    /// until the first operation.
    pub fn new(config: StoreConfig) -> Result<Self, CoreError> {
        Self::with_publisher(config, Arc::new(NoopPublisher))
    }

    pub fn with_publisher(
        config: StoreConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Result<Self, CoreError> {
        if config.cascade_concurrency == 0 {
            return Err(CoreError::Config {
                message: "cascade concurrency must be at least 1".into(),
            });
        }
        if config.find_limit == 0 || config.bulk_limit == 0 {
            return Err(CoreError::Config {
                message: "query limits must be at least 1".into(),
            });
        }

        let auth = config.credentials.as_ref().map(|c| BasicAuth {
            username: c.username.clone(),
            password: c.password.clone(),
        });
        let client = StoreClient::new(config.url.clone(), auth, &build_transport(&config))?;

        Ok(Self {
            inner: Arc::new(FacilityInner {
                client,
                config,
                publisher,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn schema(&self) -> &IdSchema {
        &self.inner.config.schema
    }

    pub(crate) fn client(&self) -> &StoreClient {
        &self.inner.client
    }

    /// Announce a committed change. Failures are logged, never returned.
    pub(crate) async fn notify<T: Serialize + ?Sized>(
        &self,
        entity: EntityKind,
        change: ChangeKind,
        payload: &T,
    ) {
        let name = event_type(entity, change);
        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                warn!(event = %name, error = %e, "could not serialize change event");
                return;
            }
        };
        if let Err(e) = self.inner.publisher.publish(&name, payload).await {
            warn!(event = %name, error = %e, "change event not delivered");
        }
    }
}

fn build_transport(config: &StoreConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
