//! The asynchronous collaborator contracts this engine drives.
//!
//! Both traits are object-safe so the sync engine can hold `Arc<dyn …>` and
//! tests can substitute in-memory fakes.

use async_trait::async_trait;
use expedient_core::{AnnotationBag, Record, RecordId};

use crate::error::ClientError;

/// Read/write access to the record collection and its annotation bags.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ordered ids of every record in the collection.
    async fn fetch_record_ids(&self) -> Result<Vec<RecordId>, ClientError>;

    /// Fetch one record. Fails with [`ClientError::NotFound`] for unknown ids.
    async fn fetch_record(&self, id: &RecordId) -> Result<Record, ClientError>;

    /// Fetch the stored annotation bag for a record; empty when none stored.
    async fn fetch_annotation_bag(&self, id: &RecordId) -> Result<AnnotationBag, ClientError>;

    /// Replace the stored annotation bag for a record. Idempotent full
    /// replace; there are no partial-field patches.
    async fn persist_annotation_bag(
        &self,
        id: &RecordId,
        bag: &AnnotationBag,
    ) -> Result<(), ClientError>;
}

/// The external file preview surface.
#[async_trait]
pub trait FileViewer: Send + Sync {
    /// Surface one of the record's files in the viewer.
    async fn show_file(&self, id: &RecordId, file_name: &str) -> Result<(), ClientError>;

    /// Blank the viewer.
    async fn clear(&self) -> Result<(), ClientError>;
}
