//! Autosaving annotation state for the active record.
//!
//! The in-memory bag is authoritative: edits apply synchronously, and only
//! the persistence calls are coalesced through a trailing-only debounce.
//! Loads and persists may fail or arrive late; an epoch counter makes sure a
//! response for a superseded record can never overwrite the active one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use expedient_client::RecordStore;
use expedient_core::{AnnotationBag, RecordId};

use crate::deferred::DeferredExecutor;

/// Settle delay before a persist is sent. Trailing only: rapid typing sends
/// no leading write.
pub const PERSIST_DEBOUNCE: Duration = Duration::from_millis(500);

/// Arguments captured when a persist is scheduled. The bag itself is
/// snapshotted at fire time so the full current state is always what ships.
#[derive(Debug, Clone)]
struct PersistRequest {
    epoch: u64,
    record_id: RecordId,
}

#[derive(Default)]
struct SyncState {
    /// Bumped on every `load`; guards against stale load/persist callbacks.
    epoch: u64,
    record_id: Option<RecordId>,
    bag: AnnotationBag,
    loading: bool,
}

// ---------------------------------------------------------------------------
// ExtraDataSynchronizer
// ---------------------------------------------------------------------------

/// Owns the active record's annotation bag and its best-effort persistence.
pub struct ExtraDataSynchronizer {
    store: Arc<dyn RecordStore>,
    state: Arc<Mutex<SyncState>>,
    persist: DeferredExecutor<PersistRequest>,
    saving_rx: watch::Receiver<bool>,
}

impl ExtraDataSynchronizer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let state = Arc::new(Mutex::new(SyncState::default()));
        let (saving_tx, saving_rx) = watch::channel(false);

        let persist = DeferredExecutor::trailing_only(PERSIST_DEBOUNCE, {
            let state = Arc::clone(&state);
            let store = Arc::clone(&store);
            move |request: PersistRequest| {
                // Snapshot the whole current bag; last writer wins.
                let snapshot = {
                    let guard = lock_state(&state);
                    if guard.epoch != request.epoch {
                        // The caretaker moved on; this persist belongs to a
                        // superseded record context.
                        return;
                    }
                    guard.bag.clone()
                };

                let store = Arc::clone(&store);
                let saving_tx = saving_tx.clone();
                tokio::spawn(async move {
                    let _ = saving_tx.send(true);
                    if let Err(e) = store
                        .persist_annotation_bag(&request.record_id, &snapshot)
                        .await
                    {
                        tracing::warn!(
                            record_id = %request.record_id,
                            error = %e,
                            "Failed to persist annotation data; in-memory state stays authoritative"
                        );
                    }
                    let _ = saving_tx.send(false);
                });
            }
        });

        Self {
            store,
            state,
            persist,
            saving_rx,
        }
    }

    /// Switch to a record and fetch its stored bag.
    ///
    /// The bag resets immediately; a pending persist for the previous record
    /// is cancelled. A fetch failure falls open to an empty, editable bag and
    /// never blocks navigation.
    pub async fn load(&self, record_id: RecordId) {
        let epoch = {
            let mut state = lock_state(&self.state);
            state.epoch += 1;
            state.record_id = Some(record_id.clone());
            state.bag = AnnotationBag::new();
            state.loading = true;
            state.epoch
        };
        self.persist.cancel();

        match self.store.fetch_annotation_bag(&record_id).await {
            Ok(bag) => {
                let mut state = lock_state(&self.state);
                if state.epoch == epoch {
                    state.bag = bag;
                    state.loading = false;
                }
            }
            Err(e) => {
                tracing::warn!(
                    record_id = %record_id,
                    error = %e,
                    "Failed to load annotation data; starting from empty"
                );
                let mut state = lock_state(&self.state);
                if state.epoch == epoch {
                    state.loading = false;
                }
            }
        }
    }

    /// Store a value for a field and schedule the debounced persist.
    ///
    /// The bag updates synchronously; the renderer sees the edit before any
    /// network traffic happens. No-op when no record is active.
    pub fn set_field(&self, label: &str, value: Value) {
        let request = {
            let mut state = lock_state(&self.state);
            let Some(record_id) = state.record_id.clone() else {
                return;
            };
            state.bag.set(label, value);
            PersistRequest {
                epoch: state.epoch,
                record_id,
            }
        };
        self.persist.trigger(request);
    }

    /// Remove a field entirely (back to "unset") and schedule the persist.
    pub fn delete_field(&self, label: &str) {
        let request = {
            let mut state = lock_state(&self.state);
            let Some(record_id) = state.record_id.clone() else {
                return;
            };
            state.bag.remove(label);
            PersistRequest {
                epoch: state.epoch,
                record_id,
            }
        };
        self.persist.trigger(request);
    }

    /// Snapshot of the current bag.
    pub fn bag(&self) -> AnnotationBag {
        lock_state(&self.state).bag.clone()
    }

    /// The record the bag currently belongs to.
    pub fn active_record(&self) -> Option<RecordId> {
        lock_state(&self.state).record_id.clone()
    }

    /// `true` while the stored bag for the active record is being fetched.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).loading
    }

    /// `true` while a persist request is in flight.
    pub fn is_saving(&self) -> bool {
        *self.saving_rx.borrow()
    }

    /// Watch the saving indicator (for UIs that want to subscribe).
    pub fn saving_watch(&self) -> watch::Receiver<bool> {
        self.saving_rx.clone()
    }
}

fn lock_state(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().expect("synchronizer state lock poisoned")
}
