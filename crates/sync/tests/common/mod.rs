//! In-memory fakes for the backend store and the external viewer, plus the
//! paused-clock helpers the timing tests lean on.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use expedient_client::{ClientError, FileViewer, RecordStore};
use expedient_core::schema::{FieldOption, FieldSchema, InputKind};
use expedient_core::{AnnotationBag, Record, RecordId};

/// Let spawned tasks run to completion at the current instant.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock and let whatever it released run.
pub async fn advance(ms: u64) {
    // Let already-spawned tasks register their timers at the current
    // instant before the clock moves.
    settle().await;
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

/// Build a record with the given id and file list.
pub fn record(id: &str, files: &[&str]) -> Record {
    Record {
        id: id.to_string(),
        name: format!("Record {id}"),
        files: files.iter().map(|f| f.to_string()).collect(),
        ..Record::default()
    }
}

/// A small annotation schema with keyboard shortcuts on the select field.
pub fn test_schema() -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("Reviewed", InputKind::Select).with_options(vec![
            FieldOption::KeyBound {
                value: "Yes".to_string(),
                key: "y".to_string(),
            },
            FieldOption::KeyBound {
                value: "No".to_string(),
                key: "n".to_string(),
            },
        ]),
        FieldSchema::new("Notes", InputKind::FreeText),
    ]
}

fn server_error(path: &str) -> ClientError {
    ClientError::Status {
        status: 500,
        path: path.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory [`RecordStore`] with per-record latency and failure injection.
#[derive(Default)]
pub struct MockStore {
    ids: Vec<RecordId>,
    records: BTreeMap<RecordId, Record>,
    bags: Mutex<BTreeMap<RecordId, AnnotationBag>>,
    /// Every successful persist, in arrival order.
    persisted: Mutex<Vec<(RecordId, AnnotationBag)>>,
    record_delay: BTreeMap<RecordId, Duration>,
    bag_delay: BTreeMap<RecordId, Duration>,
    failing_record_fetches: BTreeSet<RecordId>,
    failing_bag_fetches: BTreeSet<RecordId>,
    fail_persist: AtomicBool,
    persist_delay: Mutex<Option<Duration>>,
}

impl MockStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..Self::default()
        }
    }

    pub fn with_bag(mut self, id: &str, bag: AnnotationBag) -> Self {
        self.bags.get_mut().unwrap().insert(id.to_string(), bag);
        self
    }

    /// Delay `fetch_record` for one record (stale-response scenarios).
    pub fn with_record_delay(mut self, id: &str, delay: Duration) -> Self {
        self.record_delay.insert(id.to_string(), delay);
        self
    }

    /// Delay `fetch_annotation_bag` for one record.
    pub fn with_bag_delay(mut self, id: &str, delay: Duration) -> Self {
        self.bag_delay.insert(id.to_string(), delay);
        self
    }

    pub fn with_failing_record_fetch(mut self, id: &str) -> Self {
        self.failing_record_fetches.insert(id.to_string());
        self
    }

    pub fn with_failing_bag_fetch(mut self, id: &str) -> Self {
        self.failing_bag_fetches.insert(id.to_string());
        self
    }

    pub fn with_persist_delay(self, delay: Duration) -> Self {
        *self.persist_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every persisted `(record id, bag)` pair so far.
    pub fn persisted(&self) -> Vec<(RecordId, AnnotationBag)> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn persist_count(&self) -> usize {
        self.persisted.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn fetch_record_ids(&self) -> Result<Vec<RecordId>, ClientError> {
        Ok(self.ids.clone())
    }

    async fn fetch_record(&self, id: &RecordId) -> Result<Record, ClientError> {
        if let Some(delay) = self.record_delay.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_record_fetches.contains(id) {
            return Err(server_error(&format!("/records/{id}")));
        }
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.clone()))
    }

    async fn fetch_annotation_bag(&self, id: &RecordId) -> Result<AnnotationBag, ClientError> {
        if let Some(delay) = self.bag_delay.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_bag_fetches.contains(id) {
            return Err(server_error(&format!("/records/{id}/data")));
        }
        Ok(self.bags.lock().unwrap().get(id).cloned().unwrap_or_default())
    }

    async fn persist_annotation_bag(
        &self,
        id: &RecordId,
        bag: &AnnotationBag,
    ) -> Result<(), ClientError> {
        let delay = *self.persist_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(server_error(&format!("/records/{id}/data")));
        }
        self.bags.lock().unwrap().insert(id.clone(), bag.clone());
        self.persisted
            .lock()
            .unwrap()
            .push((id.clone(), bag.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockViewer
// ---------------------------------------------------------------------------

/// In-memory [`FileViewer`] recording every show/clear it receives.
#[derive(Default)]
pub struct MockViewer {
    shown: Mutex<Vec<(RecordId, String)>>,
    cleared: AtomicUsize,
    fail: AtomicBool,
}

impl MockViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every `(record id, file name)` show attempt, in arrival order.
    /// Attempts are recorded even when the viewer is failing.
    pub fn shown(&self) -> Vec<(RecordId, String)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileViewer for MockViewer {
    async fn show_file(&self, id: &RecordId, file_name: &str) -> Result<(), ClientError> {
        self.shown
            .lock()
            .unwrap()
            .push((id.clone(), file_name.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::ViewerRefused);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::ViewerRefused);
        }
        Ok(())
    }
}

/// Bag built from `(label, json value)` pairs.
pub fn bag(entries: &[(&str, serde_json::Value)]) -> AnnotationBag {
    entries
        .iter()
        .map(|(label, value)| (label.to_string(), value.clone()))
        .collect()
}

/// Bag with string values only, the common case in these tests.
pub fn string_bag(entries: &[(&str, &str)]) -> AnnotationBag {
    entries
        .iter()
        .map(|(label, value)| (label.to_string(), json!(value)))
        .collect()
}
