// ── Facility domain model ──
//
// Every type here is a document in one of the store's collections. IDs and
// revision tokens use the store's `_id` / `_rev` field names; everything
// else is plain snake_case JSON.

pub mod auxiliary;
pub mod building;
pub mod device;
pub mod room;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use auxiliary::{RoomConfiguration, UiConfig};
pub use building::Building;
pub use device::{Command, Device, DeviceType, Endpoint, Microservice, Port, PowerState, Role};
pub use room::Room;

/// The kinds of document the engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    #[strum(serialize = "building")]
    Building,
    #[strum(serialize = "room")]
    Room,
    #[strum(serialize = "device")]
    Device,
    #[strum(serialize = "device type")]
    DeviceType,
    #[strum(serialize = "room configuration")]
    RoomConfiguration,
    #[strum(serialize = "UI config")]
    UiConfig,
}

impl EntityKind {
    /// Collection (database) holding documents of this kind.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Building => "buildings",
            Self::Room => "rooms",
            Self::Device => "devices",
            Self::DeviceType => "device_types",
            Self::RoomConfiguration => "room_configurations",
            Self::UiConfig => "ui_configs",
        }
    }

    /// Prefix for change events (`device_type.created`, ...).
    pub const fn event_prefix(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Room => "room",
            Self::Device => "device",
            Self::DeviceType => "device_type",
            Self::RoomConfiguration => "room_configuration",
            Self::UiConfig => "ui_config",
        }
    }
}

/// A bare `{ "_id": ... }` pointer to another document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Shared accessors the repositories need on every stored entity.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn rev(&self) -> Option<&str>;
    fn set_rev(&mut self, rev: Option<String>);
}

macro_rules! impl_document {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Document for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> &str {
                    &self.id
                }

                fn rev(&self) -> Option<&str> {
                    self.rev.as_deref()
                }

                fn set_rev(&mut self, rev: Option<String>) {
                    self.rev = rev;
                }
            }
        )*
    };
}

impl_document!(
    Building => Building,
    Room => Room,
    Device => Device,
    DeviceType => DeviceType,
    RoomConfiguration => RoomConfiguration,
    UiConfig => UiConfig,
);
