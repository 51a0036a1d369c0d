// ── Entity repositories ──
//
// Per-entity CRUD lives in the submodules as `impl Facility` blocks. The
// document primitives below are shared by all of them: they know the
// collection for each `Document` type and attach entity/ID/operation
// context to every store error.

mod building;
mod device;
mod device_type;
mod room;
mod room_configuration;
mod ui_config;

use tracing::debug;

use crate::error::{CoreError, Operation};
use crate::facility::Facility;
use crate::model::{Document, EntityKind};

impl Facility {
    /// Fetch one document by ID.
    pub(crate) async fn fetch<T: Document>(&self, id: &str) -> Result<T, CoreError> {
        self.client()
            .get_document(T::KIND.collection(), id)
            .await
            .map_err(|e| CoreError::store(e, T::KIND, id, Operation::Get))
    }

    /// Fetch a document that `entity`/`id` refers to. Absence becomes
    /// `MissingReference` against the referring entity.
    pub(crate) async fn require<T: Document>(
        &self,
        entity: EntityKind,
        id: &str,
        target: &str,
    ) -> Result<T, CoreError> {
        match self.fetch::<T>(target).await {
            Err(CoreError::NotFound { .. }) => Err(CoreError::MissingReference {
                entity,
                id: id.to_owned(),
                missing: T::KIND,
                missing_id: target.to_owned(),
            }),
            other => other,
        }
    }

    /// Insert a new document. Any revision on `doc` is dropped so a create
    /// can never overwrite; a taken ID answers `Conflict`.
    pub(crate) async fn insert<T: Document>(&self, doc: &T) -> Result<T, CoreError> {
        let mut doc = doc.clone();
        doc.set_rev(None);
        let resp = self
            .client()
            .create_document(T::KIND.collection(), &doc)
            .await
            .map_err(|e| CoreError::store(e, T::KIND, doc.id(), Operation::Create))?;
        debug!(collection = T::KIND.collection(), id = %resp.id, rev = %resp.rev, "inserted");
        doc.set_rev(Some(resp.rev));
        Ok(doc)
    }

    /// Full replace guarded by the revision `doc` carries.
    pub(crate) async fn replace<T: Document>(&self, doc: &T) -> Result<T, CoreError> {
        let resp = self
            .client()
            .replace_document(T::KIND.collection(), doc.id(), doc.rev(), doc)
            .await
            .map_err(|e| CoreError::store(e, T::KIND, doc.id(), Operation::Update))?;
        let mut stored = doc.clone();
        stored.set_rev(Some(resp.rev));
        Ok(stored)
    }

    /// Delete with the revision fetched just before. Returns the document
    /// as it was.
    pub(crate) async fn remove<T: Document>(&self, id: &str) -> Result<T, CoreError> {
        let current: T = self.fetch(id).await?;
        let rev = current.rev().ok_or_else(|| {
            CoreError::Internal(format!("{} {id} came back without a revision", T::KIND))
        })?;
        self.client()
            .delete_document(T::KIND.collection(), id, rev)
            .await
            .map_err(|e| CoreError::store(e, T::KIND, id, Operation::Delete))?;
        Ok(current)
    }

    /// Rename a leaf document: create the new one, then delete the old.
    pub(crate) async fn relocate<T: Document>(&self, old_id: &str, doc: &T) -> Result<T, CoreError> {
        let created = self.insert(doc).await?;
        self.remove::<T>(old_id).await?;
        Ok(created)
    }
}
