// fmdb-core: Hierarchical consistency engine over the facility document store.
//
// Buildings contain rooms, rooms contain devices, and the store knows none
// of it. This crate encodes the hierarchy in document IDs, checks references
// before every write, and carries renames and deletes down the tree.

pub mod assembly;
pub mod cascade;
pub mod config;
pub mod error;
pub mod facility;
pub mod identifier;
pub mod model;
pub mod notify;
pub mod query;
mod repository;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cascade::{CascadeReport, ChildFailure, Renamed};
pub use config::{MissingTypePolicy, StoreConfig, StoreCredentials, TlsVerification};
pub use error::{CoreError, Operation};
pub use facility::Facility;
pub use identifier::{BuildingId, DeviceId, IdError, IdSchema, RoomId};
pub use notify::{BroadcastPublisher, ChangeEvent, ChangeKind, EventPublisher, NoopPublisher};
pub use query::{QueryResult, Scope};

pub use model::{
    Building, Command, Device, DeviceType, Document, DocumentRef, Endpoint, EntityKind,
    Microservice, Port, PowerState, Role, Room, RoomConfiguration, UiConfig,
};
