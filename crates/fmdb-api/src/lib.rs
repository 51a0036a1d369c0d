// fmdb-api: Async HTTP gateway to the facility document store.

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod transport;

pub use client::{BasicAuth, StoreClient};
pub use error::Error;
pub use models::{FindResponse, UpsertResponse};
pub use query::FindQuery;
pub use transport::{TlsMode, TransportConfig};
