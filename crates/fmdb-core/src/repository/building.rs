use serde_json::json;
use tracing::{info, warn};

use crate::cascade::{CascadeReport, Renamed, fan_out};
use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{Building, EntityKind, Room};
use crate::notify::ChangeKind;
use crate::query::QueryResult;

impl Facility {
    pub async fn create_building(&self, building: &Building) -> Result<Building, CoreError> {
        building.validate(self.schema())?;
        let created = self.insert(building).await?;
        info!(building = %created.id, "building created");
        self.notify(EntityKind::Building, ChangeKind::Created, &created)
            .await;
        Ok(created)
    }

    pub async fn get_building(&self, id: &str) -> Result<Building, CoreError> {
        self.fetch(id).await
    }

    pub async fn list_buildings(&self) -> Result<QueryResult<Building>, CoreError> {
        self.all_of().await
    }

    /// Replace `id` with `building`. A different ID on `building` renames,
    /// and any room that fails to follow turns into `CascadeIncomplete`.
    pub async fn update_building(&self, id: &str, building: &Building) -> Result<Building, CoreError> {
        if building.id != id {
            return self.rename_building(id, building).await?.into_result(id);
        }
        building.validate(self.schema())?;
        let updated = self.replace(building).await?;
        info!(building = %updated.id, "building updated");
        self.notify(EntityKind::Building, ChangeKind::Updated, &updated)
            .await;
        Ok(updated)
    }

    /// Move a building to `building.id`, taking every room (and each
    /// room's devices) along.
    ///
    /// Order: collect every room under the old ID, create the new building,
    /// delete the old one, then move the rooms. Failures before the new building
    /// exists are returned as errors; failures after it are in the report.
    pub async fn rename_building(
        &self,
        old_id: &str,
        building: &Building,
    ) -> Result<Renamed<Building>, CoreError> {
        building.validate(self.schema())?;
        let existing: Building = self.fetch(old_id).await?;
        let children = self
            .all_children_of::<Room>(old_id)
            .await?
            .into_iter()
            .map(|room| (room.id.clone(), room))
            .collect();

        let created = self.insert(building).await?;
        self.remove::<Building>(old_id).await?;
        info!(from = %old_id, to = %created.id, "building renamed");

        let new_id = created.id.clone();
        let old = old_id.to_owned();
        let cascade = fan_out(children, self.config().cascade_concurrency, |room: Room| {
            let facility = self.clone();
            let old = old.clone();
            let new_id = new_id.clone();
            async move { facility.move_room(room, &old, &new_id).await }
        })
        .await;

        if !cascade.is_complete() {
            warn!(
                from = %old_id,
                to = %created.id,
                failed = cascade.failed.len(),
                "building rename left rooms behind"
            );
        }
        self.notify(
            EntityKind::Building,
            ChangeKind::Renamed,
            &json!({ "from": existing.id, "to": created.id, "moved": cascade.moved.len() }),
        )
        .await;

        Ok(Renamed {
            entity: created,
            cascade,
        })
    }

    /// Delete a building that has no rooms left.
    pub async fn delete_building(&self, id: &str) -> Result<(), CoreError> {
        self.ensure_no_rooms(id).await?;
        let removed: Building = self.remove(id).await?;
        info!(building = %id, "building deleted");
        self.notify(EntityKind::Building, ChangeKind::Deleted, &removed)
            .await;
        Ok(())
    }

    /// One room's share of a building rename.
    async fn move_room(
        &self,
        room: Room,
        old_building: &str,
        new_building: &str,
    ) -> Result<CascadeReport, CoreError> {
        let old_id = room.id.clone();
        let mut moved = room;
        moved.id = self
            .schema()
            .reparent(EntityKind::Room, &old_id, old_building, new_building)?;
        let renamed = self.rename_room(&old_id, &moved).await?;
        let mut report = CascadeReport::moved_one(old_id, renamed.entity.id);
        report.merge(renamed.cascade);
        Ok(report)
    }
}
