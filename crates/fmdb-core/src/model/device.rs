// ── Devices, device types, and their value objects ──
//
// A stored Device carries only `{ "_id" }` in its `type` field; the
// DeviceType document is the single source of truth for everything
// type-level. Listings substitute the full type back in (see `assembly`).

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::identifier::{DeviceId, IdSchema};
use crate::model::EntityKind;

/// Minimum ID length for roles, commands, microservices, endpoints and
/// power states.
const MIN_VALUE_ID_LEN: usize = 3;
const MIN_DEVICE_NAME_LEN: usize = 2;

// ── Device ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Network address (hostname or IP).
    #[serde(default)]
    pub address: String,
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Device {
    /// Shape checks only; existence of the room, port devices and type is
    /// checked by the repository.
    pub fn validate(&self, schema: &IdSchema) -> Result<DeviceId, CoreError> {
        let id = schema.parse_device(&self.id)?;
        let fail = |message: String| CoreError::invalid(EntityKind::Device, message);

        if self.name.chars().count() < MIN_DEVICE_NAME_LEN {
            return Err(fail(format!(
                "{}: name must be at least {MIN_DEVICE_NAME_LEN} characters long",
                self.id
            )));
        }
        if self.device_type.id.is_empty() {
            return Err(fail(format!("{}: missing device type", self.id)));
        }
        if self.roles.is_empty() {
            return Err(fail(format!("{}: must include at least 1 role", self.id)));
        }
        for role in &self.roles {
            role.validate().map_err(|e| fail(format!("{}: {e}", self.id)))?;
        }
        for port in &self.ports {
            port.validate().map_err(|e| fail(format!("{}: {e}", self.id)))?;
        }
        Ok(id)
    }

    /// Case-insensitive role membership.
    pub fn has_role(&self, role: &str) -> bool {
        let role = role.to_lowercase();
        self.roles.iter().any(|r| r.id.to_lowercase() == role)
    }

    /// Case-insensitive device type match on the type ID.
    pub fn is_type(&self, type_id: &str) -> bool {
        self.device_type.id.to_lowercase() == type_id.to_lowercase()
    }

    /// Every device ID referenced from this device's ports.
    pub fn port_endpoints(&self) -> impl Iterator<Item = &str> {
        self.ports.iter().flat_map(Port::endpoints)
    }
}

// ── DeviceType ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub input: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub source: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub destination: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub power_states: Vec<PowerState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl DeviceType {
    /// The form a device persists: `{ "_id": id }` and nothing else.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// True when this carries more than a bare ID, i.e. enough to create
    /// the type on the fly.
    pub fn is_fully_specified(&self) -> bool {
        let reference = Self::reference(self.id.clone());
        let mut unversioned = self.clone();
        unversioned.rev = None;
        !self.id.is_empty() && unversioned != reference
    }

    /// Shallow validation needs only an ID; `deep` also validates every
    /// port and command.
    pub fn validate(&self, deep: bool) -> Result<(), CoreError> {
        let fail = |message: String| CoreError::invalid(EntityKind::DeviceType, message);
        if self.id.is_empty() {
            return Err(fail("missing ID".to_owned()));
        }
        if deep {
            for port in &self.ports {
                port.validate().map_err(|e| fail(format!("{}: {e}", self.id)))?;
            }
            for command in &self.commands {
                command.validate().map_err(|e| fail(format!("{}: {e}", self.id)))?;
            }
            for state in &self.power_states {
                state.validate().map_err(|e| fail(format!("{}: {e}", self.id)))?;
            }
        }
        Ok(())
    }
}

// ── Value objects ───────────────────────────────────────────────────

/// A physical or logical connection point on a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub friendly_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_device: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Port {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("port ID must not be empty".to_owned());
        }
        Ok(())
    }

    /// Source and destination device IDs, skipping unset or empty ones.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        [&self.source_device, &self.destination_device]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Role {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        check_value_id("role", &self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerState {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PowerState {
    pub fn validate(&self) -> Result<(), String> {
        check_value_id("power state", &self.id)
    }
}

/// An API call a device type supports, served by some microservice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub microservice: Microservice,
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Command {
    pub fn validate(&self) -> Result<(), String> {
        check_value_id("command", &self.id)?;
        self.microservice
            .validate()
            .map_err(|e| format!("command {}: {e}", self.id))?;
        self.endpoint
            .validate()
            .map_err(|e| format!("command {}: {e}", self.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microservice {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Microservice {
    pub fn validate(&self) -> Result<(), String> {
        check_value_id("microservice", &self.id)?;
        check_request_uri("microservice address", &self.address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Endpoint {
    pub fn validate(&self) -> Result<(), String> {
        check_value_id("endpoint", &self.id)?;
        check_request_uri("endpoint path", &self.path)
    }
}

fn check_value_id(what: &str, id: &str) -> Result<(), String> {
    if id.chars().count() < MIN_VALUE_ID_LEN {
        return Err(format!(
            "{what} ID {id:?} must be at least {MIN_VALUE_ID_LEN} characters long"
        ));
    }
    Ok(())
}

/// Accepts an absolute URL or an absolute path (`/power/:state`).
fn check_request_uri(what: &str, value: &str) -> Result<(), String> {
    if value.starts_with('/') {
        if value.chars().any(char::is_whitespace) {
            return Err(format!("{what} {value:?} contains whitespace"));
        }
        return Ok(());
    }
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| format!("{what} {value:?} is not a URL or absolute path: {e}"))
}
