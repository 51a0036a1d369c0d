// ── Cascade engine ──
//
// Structural changes that reach below the entity being changed: delete
// guards (a parent may not be deleted while children exist) and rename
// propagation (children follow their parent to its new ID). Children are
// moved on a bounded `JoinSet`; every outcome lands in a `CascadeReport`.

use std::collections::BTreeSet;
use std::future::Future;

use tokio::task::JoinSet;
use tracing::warn;

use crate::error::CoreError;
use crate::facility::Facility;
use crate::model::{Device, Document, EntityKind, Room};

// ── Reports ─────────────────────────────────────────────────────────

/// A child that could not be moved.
#[derive(Debug)]
pub struct ChildFailure {
    pub id: String,
    pub error: CoreError,
}

/// Aggregate outcome of propagating one rename.
#[derive(Debug, Default)]
pub struct CascadeReport {
    /// `(old_id, new_id)` for every document moved, nested ones included.
    pub moved: Vec<(String, String)>,
    pub failed: Vec<ChildFailure>,
    /// `(device, target)` port links from outside the moved room that
    /// still name a device's old ID.
    pub dangling: Vec<(String, String)>,
}

impl CascadeReport {
    pub fn moved_one(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            moved: vec![(old.into(), new.into())],
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }

    pub fn merge(&mut self, other: CascadeReport) {
        self.moved.extend(other.moved);
        self.failed.extend(other.failed);
        self.dangling.extend(other.dangling);
    }
}

/// The entity as it now exists under its new ID, plus what happened to its
/// descendants.
#[derive(Debug)]
pub struct Renamed<T> {
    pub entity: T,
    pub cascade: CascadeReport,
}

impl<T: Document> Renamed<T> {
    /// Collapse into a plain result: any failed child turns into
    /// `CascadeIncomplete`.
    pub fn into_result(self, old_id: &str) -> Result<T, CoreError> {
        if self.cascade.is_complete() {
            return Ok(self.entity);
        }
        Err(CoreError::CascadeIncomplete {
            entity: T::KIND,
            from: old_id.to_owned(),
            to: self.entity.id().to_owned(),
            failed: self.cascade.failed_ids(),
        })
    }
}

// ── Bounded fan-out ─────────────────────────────────────────────────

/// Run `task` for every `(id, child)` with at most `concurrency` in flight
/// and fold the outcomes into one report. A child whose task panics is
/// reported as failed.
pub(crate) async fn fan_out<C, F, Fut>(
    children: Vec<(String, C)>,
    concurrency: usize,
    task: F,
) -> CascadeReport
where
    C: Send + 'static,
    F: Fn(C) -> Fut,
    Fut: Future<Output = Result<CascadeReport, CoreError>> + Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut join_set = JoinSet::new();
    let mut pending = BTreeSet::new();
    let mut report = CascadeReport::default();

    for (id, child) in children {
        pending.insert(id.clone());
        let fut = task(child);
        join_set.spawn(async move { (id, fut.await) });

        if join_set.len() >= concurrency {
            if let Some(joined) = join_set.join_next().await {
                settle(&mut report, &mut pending, joined);
            }
        }
    }

    while let Some(joined) = join_set.join_next().await {
        settle(&mut report, &mut pending, joined);
    }

    // Whatever is still pending never reported back.
    for id in pending {
        report.failed.push(ChildFailure {
            id,
            error: CoreError::Internal("cascade task aborted before finishing".into()),
        });
    }
    report
}

fn settle(
    report: &mut CascadeReport,
    pending: &mut BTreeSet<String>,
    joined: Result<(String, Result<CascadeReport, CoreError>), tokio::task::JoinError>,
) {
    match joined {
        Ok((id, Ok(child))) => {
            pending.remove(&id);
            report.merge(child);
        }
        Ok((id, Err(error))) => {
            warn!(child = %id, error = %error, "cascade child failed");
            pending.remove(&id);
            report.failed.push(ChildFailure { id, error });
        }
        Err(e) => warn!(error = %e, "cascade task panicked"),
    }
}

// ── Delete guards ───────────────────────────────────────────────────

impl Facility {
    /// Refuse while any room exists under `building_id`.
    pub async fn ensure_no_rooms(&self, building_id: &str) -> Result<(), CoreError> {
        let rooms = self.children_of::<Room>(building_id).await?;
        guard(EntityKind::Building, building_id, rooms.ids())
    }

    /// Refuse while any device exists under `room_id`.
    pub async fn ensure_no_devices(&self, room_id: &str) -> Result<(), CoreError> {
        let devices = self.children_of::<Device>(room_id).await?;
        guard(EntityKind::Room, room_id, devices.ids())
    }
}

fn guard(entity: EntityKind, id: &str, blocking: Vec<&str>) -> Result<(), CoreError> {
    if blocking.is_empty() {
        return Ok(());
    }
    Err(CoreError::PreconditionFailed {
        entity,
        id: id.to_owned(),
        blocking: blocking.into_iter().map(str::to_owned).collect(),
    })
}
