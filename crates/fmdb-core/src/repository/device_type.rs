use serde_json::json;
use tracing::info;

use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{DeviceType, EntityKind};
use crate::notify::ChangeKind;
use crate::query::QueryResult;

impl Facility {
    /// Create a device type. `deep` also validates its ports, commands and
    /// power states.
    pub async fn create_device_type(
        &self,
        device_type: &DeviceType,
        deep: bool,
    ) -> Result<DeviceType, CoreError> {
        device_type.validate(deep)?;
        let created = self.insert(device_type).await?;
        info!(device_type = %created.id, "device type created");
        self.notify(EntityKind::DeviceType, ChangeKind::Created, &created)
            .await;
        Ok(created)
    }

    pub async fn get_device_type(&self, id: &str) -> Result<DeviceType, CoreError> {
        self.fetch(id).await
    }

    pub async fn list_device_types(&self) -> Result<QueryResult<DeviceType>, CoreError> {
        self.all_of().await
    }

    /// Replace `id` with `device_type`, validated the same way as
    /// `create_device_type`. Devices reference types by ID, so a rename
    /// leaves existing devices pointing at the old ID.
    pub async fn update_device_type(
        &self,
        id: &str,
        device_type: &DeviceType,
        deep: bool,
    ) -> Result<DeviceType, CoreError> {
        device_type.validate(deep)?;
        if device_type.id != id {
            let created = self.relocate(id, device_type).await?;
            info!(from = %id, to = %created.id, "device type renamed");
            self.notify(
                EntityKind::DeviceType,
                ChangeKind::Renamed,
                &json!({ "from": id, "to": created.id }),
            )
            .await;
            return Ok(created);
        }
        let updated = self.replace(device_type).await?;
        info!(device_type = %updated.id, "device type updated");
        self.notify(EntityKind::DeviceType, ChangeKind::Updated, &updated)
            .await;
        Ok(updated)
    }

    pub async fn delete_device_type(&self, id: &str) -> Result<(), CoreError> {
        let removed: DeviceType = self.remove(id).await?;
        info!(device_type = %id, "device type deleted");
        self.notify(EntityKind::DeviceType, ChangeKind::Deleted, &removed)
            .await;
        Ok(())
    }
}
