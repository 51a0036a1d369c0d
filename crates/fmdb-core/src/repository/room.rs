use serde_json::json;
use tracing::{info, warn};

use crate::cascade::{Renamed, fan_out};
use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{Building, Device, EntityKind, Room, RoomConfiguration};
use crate::notify::ChangeKind;
use crate::query::QueryResult;

impl Facility {
    /// Create a room. The building named by the ID prefix must exist, as
    /// must the room configuration if one is referenced.
    pub async fn create_room(&self, room: &Room) -> Result<Room, CoreError> {
        self.check_room(room).await?;
        let created = self.insert(room).await?;
        info!(room = %created.id, "room created");
        self.notify(EntityKind::Room, ChangeKind::Created, &created).await;
        Ok(created)
    }

    pub async fn get_room(&self, id: &str) -> Result<Room, CoreError> {
        self.fetch(id).await
    }

    pub async fn list_rooms(&self) -> Result<QueryResult<Room>, CoreError> {
        self.all_of().await
    }

    pub async fn rooms_in_building(&self, building_id: &str) -> Result<QueryResult<Room>, CoreError> {
        self.children_of(building_id).await
    }

    /// Replace `id` with `room`; a different ID renames and moves devices.
    pub async fn update_room(&self, id: &str, room: &Room) -> Result<Room, CoreError> {
        if room.id != id {
            return self.rename_room(id, room).await?.into_result(id);
        }
        self.check_room(room).await?;
        let updated = self.replace(room).await?;
        info!(room = %updated.id, "room updated");
        self.notify(EntityKind::Room, ChangeKind::Updated, &updated).await;
        Ok(updated)
    }

    /// Move a room to `room.id` and every device in it along with it.
    ///
    /// Devices keep their suffix. Port endpoints that pointed at devices in
    /// the old room are rewritten to the new room; the rest are untouched.
    /// Ports elsewhere that point into the room keep the old IDs and are
    /// listed in the report's `dangling`.
    pub async fn rename_room(&self, old_id: &str, room: &Room) -> Result<Renamed<Room>, CoreError> {
        self.check_room(room).await?;
        let existing: Room = self.fetch(old_id).await?;
        let devices = self.all_children_of::<Device>(old_id).await?;
        let dangling = self.links_from_outside(old_id, &devices).await;
        let children = devices
            .into_iter()
            .map(|device| (device.id.clone(), device))
            .collect();

        let created = self.insert(room).await?;
        self.remove::<Room>(old_id).await?;
        info!(from = %old_id, to = %created.id, "room renamed");

        let old = old_id.to_owned();
        let new_id = created.id.clone();
        let mut cascade = fan_out(children, self.config().cascade_concurrency, |device: Device| {
            let facility = self.clone();
            let old = old.clone();
            let new_id = new_id.clone();
            async move { facility.move_device(device, &old, &new_id).await }
        })
        .await;
        cascade.dangling.extend(dangling);

        if !cascade.is_complete() {
            warn!(
                from = %old_id,
                to = %created.id,
                failed = cascade.failed.len(),
                "room rename left devices behind"
            );
        }
        self.notify(
            EntityKind::Room,
            ChangeKind::Renamed,
            &json!({ "from": existing.id, "to": created.id, "moved": cascade.moved.len() }),
        )
        .await;

        Ok(Renamed {
            entity: created,
            cascade,
        })
    }

    /// Delete a room that has no devices left.
    pub async fn delete_room(&self, id: &str) -> Result<(), CoreError> {
        self.ensure_no_devices(id).await?;
        let removed: Room = self.remove(id).await?;
        info!(room = %id, "room deleted");
        self.notify(EntityKind::Room, ChangeKind::Deleted, &removed).await;
        Ok(())
    }

    async fn check_room(&self, room: &Room) -> Result<(), CoreError> {
        let id = room.validate(self.schema())?;
        self.require::<Building>(EntityKind::Room, &room.id, id.building_id().as_str())
            .await?;
        if let Some(config) = &room.configuration {
            self.require::<RoomConfiguration>(EntityKind::Room, &room.id, &config.id)
                .await?;
        }
        Ok(())
    }
}
