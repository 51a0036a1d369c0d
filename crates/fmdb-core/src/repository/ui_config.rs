// UI configs are stored under the ID of the room they belong to.

use serde_json::json;
use tracing::info;

use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{EntityKind, UiConfig};
use crate::notify::ChangeKind;

impl Facility {
    /// Store `config` as the UI config of `room_id`. Its own `_id` is
    /// overwritten with the room ID.
    pub async fn create_ui_config(&self, room_id: &str, config: &UiConfig) -> Result<UiConfig, CoreError> {
        self.schema().parse_room(room_id)?;
        let keyed = UiConfig {
            id: room_id.to_owned(),
            ..config.clone()
        };
        let created = self.insert(&keyed).await?;
        info!(room = %room_id, "UI config created");
        self.notify(EntityKind::UiConfig, ChangeKind::Created, &created)
            .await;
        Ok(created)
    }

    pub async fn get_ui_config(&self, room_id: &str) -> Result<UiConfig, CoreError> {
        self.fetch(room_id).await
    }

    pub async fn update_ui_config(&self, id: &str, config: &UiConfig) -> Result<UiConfig, CoreError> {
        if config.id != id {
            self.schema().parse_room(&config.id)?;
            let created = self.relocate(id, config).await?;
            self.notify(
                EntityKind::UiConfig,
                ChangeKind::Renamed,
                &json!({ "from": id, "to": created.id }),
            )
            .await;
            return Ok(created);
        }
        let updated = self.replace(config).await?;
        info!(room = %updated.id, "UI config updated");
        self.notify(EntityKind::UiConfig, ChangeKind::Updated, &updated)
            .await;
        Ok(updated)
    }

    pub async fn delete_ui_config(&self, id: &str) -> Result<(), CoreError> {
        let removed: UiConfig = self.remove(id).await?;
        info!(room = %id, "UI config deleted");
        self.notify(EntityKind::UiConfig, ChangeKind::Deleted, &removed)
            .await;
        Ok(())
    }
}
