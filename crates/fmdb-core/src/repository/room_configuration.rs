use serde_json::json;
use tracing::info;

use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{EntityKind, RoomConfiguration};
use crate::notify::ChangeKind;
use crate::query::QueryResult;

impl Facility {
    pub async fn create_room_configuration(
        &self,
        config: &RoomConfiguration,
    ) -> Result<RoomConfiguration, CoreError> {
        check_id(config)?;
        let created = self.insert(config).await?;
        info!(room_configuration = %created.id, "room configuration created");
        self.notify(EntityKind::RoomConfiguration, ChangeKind::Created, &created)
            .await;
        Ok(created)
    }

    pub async fn get_room_configuration(&self, id: &str) -> Result<RoomConfiguration, CoreError> {
        self.fetch(id).await
    }

    pub async fn list_room_configurations(
        &self,
    ) -> Result<QueryResult<RoomConfiguration>, CoreError> {
        self.all_of().await
    }

    pub async fn update_room_configuration(
        &self,
        id: &str,
        config: &RoomConfiguration,
    ) -> Result<RoomConfiguration, CoreError> {
        check_id(config)?;
        if config.id != id {
            let created = self.relocate(id, config).await?;
            self.notify(
                EntityKind::RoomConfiguration,
                ChangeKind::Renamed,
                &json!({ "from": id, "to": created.id }),
            )
            .await;
            return Ok(created);
        }
        let updated = self.replace(config).await?;
        info!(room_configuration = %updated.id, "room configuration updated");
        self.notify(EntityKind::RoomConfiguration, ChangeKind::Updated, &updated)
            .await;
        Ok(updated)
    }

    pub async fn delete_room_configuration(&self, id: &str) -> Result<(), CoreError> {
        let removed: RoomConfiguration = self.remove(id).await?;
        info!(room_configuration = %id, "room configuration deleted");
        self.notify(EntityKind::RoomConfiguration, ChangeKind::Deleted, &removed)
            .await;
        Ok(())
    }
}

fn check_id(config: &RoomConfiguration) -> Result<(), CoreError> {
    if config.id.trim().is_empty() {
        return Err(CoreError::invalid(EntityKind::RoomConfiguration, "missing ID"));
    }
    Ok(())
}
