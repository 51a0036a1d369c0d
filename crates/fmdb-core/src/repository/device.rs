// Device repository: creation checks the room, the port endpoints and the
// device type, in that order, so a rejected create writes nothing. Only a
// missing but fully described type is written ahead of the device.

use std::collections::HashSet;

use serde_json::json;
use tracing::{info, warn};

use crate::cascade::CascadeReport;
use crate::config::MissingTypePolicy;
use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{Device, DeviceType, EntityKind, Room};
use crate::notify::ChangeKind;
use crate::query::{QueryResult, Scope};

impl Facility {
    pub async fn create_device(&self, device: &Device) -> Result<Device, CoreError> {
        let created = self.store_new_device(device).await?;
        info!(device = %created.id, device_type = %created.device_type.id, "device created");
        self.notify(EntityKind::Device, ChangeKind::Created, &created)
            .await;
        Ok(created)
    }

    /// A device with its type resolved. Under `MissingTypePolicy::Omit` a
    /// dangling type reference is left as-is.
    pub async fn get_device(&self, id: &str) -> Result<Device, CoreError> {
        let mut device: Device = self.fetch(id).await?;
        match self.fetch::<DeviceType>(&device.device_type.id).await {
            Ok(found) => device.device_type = found,
            Err(CoreError::NotFound { .. }) => match self.config().missing_types {
                MissingTypePolicy::Omit => {
                    warn!(device = %id, device_type = %device.device_type.id, "device type does not exist");
                }
                MissingTypePolicy::Fail => {
                    return Err(CoreError::NotFound {
                        entity: EntityKind::DeviceType,
                        id: device.device_type.id,
                    });
                }
            },
            Err(e) => return Err(e),
        }
        Ok(device)
    }

    /// Every device, types unresolved, with the bulk limit.
    pub async fn list_devices(&self) -> Result<QueryResult<Device>, CoreError> {
        self.query(Scope::Everything, self.config().bulk_limit)
            .await
    }

    /// Devices in one room, types resolved.
    pub async fn devices_in_room(&self, room_id: &str) -> Result<QueryResult<Device>, CoreError> {
        let devices = self.children_of::<Device>(room_id).await?;
        self.assemble(devices).await
    }

    /// Devices in one room holding `role` (case-insensitive).
    pub async fn devices_in_room_with_role(
        &self,
        room_id: &str,
        role: &str,
    ) -> Result<QueryResult<Device>, CoreError> {
        Ok(self
            .devices_in_room(room_id)
            .await?
            .filter(|d| d.has_role(role)))
    }

    /// Devices anywhere holding `role` whose type ID is `type_id`, both
    /// compared case-insensitively. Types are left unresolved.
    pub async fn devices_by_role_and_type(
        &self,
        role: &str,
        type_id: &str,
    ) -> Result<QueryResult<Device>, CoreError> {
        Ok(self
            .list_devices()
            .await?
            .filter(|d| d.has_role(role) && d.is_type(type_id)))
    }

    /// Replace `id` with `device`. A different ID on `device` renames it:
    /// the new device is created with full validation, then the old one is
    /// deleted.
    pub async fn update_device(&self, id: &str, device: &Device) -> Result<Device, CoreError> {
        if device.id != id {
            return self.rename_device(id, device).await;
        }
        device.validate(self.schema())?;
        self.check_ports(device).await?;
        let device_type = self.ensure_device_type(device).await?;

        let mut updated = self.replace(&by_reference(device, &device_type)).await?;
        info!(device = %updated.id, "device updated");
        self.notify(EntityKind::Device, ChangeKind::Updated, &updated)
            .await;
        updated.device_type = device_type;
        Ok(updated)
    }

    pub async fn rename_device(&self, old_id: &str, device: &Device) -> Result<Device, CoreError> {
        self.fetch::<Device>(old_id).await?;
        let created = self.store_new_device(device).await?;
        self.remove::<Device>(old_id).await?;
        info!(from = %old_id, to = %created.id, "device renamed");
        self.notify(
            EntityKind::Device,
            ChangeKind::Renamed,
            &json!({ "from": old_id, "to": created.id }),
        )
        .await;
        Ok(created)
    }

    pub async fn delete_device(&self, id: &str) -> Result<(), CoreError> {
        let removed: Device = self.remove(id).await?;
        info!(device = %id, "device deleted");
        self.notify(EntityKind::Device, ChangeKind::Deleted, &removed)
            .await;
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn store_new_device(&self, device: &Device) -> Result<Device, CoreError> {
        let id = device.validate(self.schema())?;
        self.require::<Room>(EntityKind::Device, &device.id, id.room_id().as_str())
            .await?;
        self.check_ports(device).await?;
        let device_type = self.ensure_device_type(device).await?;

        let mut created = self.insert(&by_reference(device, &device_type)).await?;
        created.device_type = device_type;
        Ok(created)
    }

    /// Every port endpoint must name an existing device.
    async fn check_ports(&self, device: &Device) -> Result<(), CoreError> {
        for endpoint in device.port_endpoints() {
            self.require::<Device>(EntityKind::Device, &device.id, endpoint)
                .await?;
        }
        Ok(())
    }

    /// The stored type for `device`, creating it first when it is missing
    /// and the device describes it fully.
    async fn ensure_device_type(&self, device: &Device) -> Result<DeviceType, CoreError> {
        let wanted = &device.device_type;
        match self.fetch::<DeviceType>(&wanted.id).await {
            Err(CoreError::NotFound { .. }) if wanted.is_fully_specified() => {
                info!(device = %device.id, device_type = %wanted.id, "provisioning missing device type");
                self.create_device_type(wanted, true).await
            }
            Err(CoreError::NotFound { .. }) => Err(CoreError::invalid(
                EntityKind::Device,
                format!(
                    "{}: device type {} does not exist and the device does not describe it",
                    device.id, wanted.id
                ),
            )),
            other => other,
        }
    }

    /// Port links held by devices outside `room_id` that target one of
    /// `moving`. A room rename rewrites only links inside the room, so
    /// these go on naming the old IDs.
    pub(crate) async fn links_from_outside(
        &self,
        room_id: &str,
        moving: &[Device],
    ) -> Vec<(String, String)> {
        if moving.is_empty() {
            return Vec::new();
        }
        let moving: HashSet<&str> = moving.iter().map(|d| d.id.as_str()).collect();
        let everyone = match self.list_devices().await {
            Ok(found) => found.docs,
            Err(e) => {
                warn!(room = %room_id, error = %e, "cannot check for links into renamed room");
                return Vec::new();
            }
        };

        let mut links = Vec::new();
        for device in everyone.iter().filter(|d| !moving.contains(d.id.as_str())) {
            for target in device.port_endpoints().filter(|t| moving.contains(t)) {
                warn!(
                    device = %device.id,
                    linked = target,
                    room = %room_id,
                    "port link will name a device's old ID after the room rename"
                );
                links.push((device.id.clone(), target.to_owned()));
            }
        }
        links
    }

    /// One device's share of a room rename.
    pub(crate) async fn move_device(
        &self,
        device: Device,
        old_room: &str,
        new_room: &str,
    ) -> Result<CascadeReport, CoreError> {
        let schema = *self.schema();
        let old_id = device.id.clone();

        let mut moved = device;
        moved.id = schema.reparent(EntityKind::Device, &old_id, old_room, new_room)?;
        for port in &mut moved.ports {
            let ends = [&mut port.source_device, &mut port.destination_device];
            for end in ends.into_iter().flatten() {
                if let Ok(rewritten) = schema.reparent(EntityKind::Device, end, old_room, new_room) {
                    *end = rewritten;
                }
            }
        }

        let created = self.relocate(&old_id, &moved).await?;
        self.notify(
            EntityKind::Device,
            ChangeKind::Renamed,
            &json!({ "from": old_id, "to": created.id }),
        )
        .await;
        Ok(CascadeReport::moved_one(old_id, created.id))
    }
}

/// The persisted form: identical, except `type` is a bare reference.
fn by_reference(device: &Device, device_type: &DeviceType) -> Device {
    Device {
        device_type: DeviceType::reference(device_type.id.clone()),
        ..device.clone()
    }
}
