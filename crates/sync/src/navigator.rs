//! Deferred file-preview triggering.
//!
//! Two independent debounce paths drive the external viewer: a leading+
//! trailing one for record switches (instant feedback on the first switch,
//! only the final record after a fast-paging burst) and a trailing-only one
//! for explicit clicks and digit keys (key-repeat settles to the last
//! intended file without flooding the viewer).

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use expedient_client::FileViewer;
use expedient_core::files::choose_priority_file;
use expedient_core::RecordId;

use crate::deferred::DeferredExecutor;

/// Settle delay after a record switch before the priority file is shown.
pub const SWITCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Settle delay for explicit file selection (click or digit key).
pub const SELECT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct SwitchRequest {
    record_id: RecordId,
    files: Vec<String>,
}

#[derive(Debug, Clone)]
struct ShowRequest {
    record_id: RecordId,
    file_name: String,
}

#[derive(Default)]
struct NavState {
    record_id: Option<RecordId>,
    files: Vec<String>,
}

// ---------------------------------------------------------------------------
// FileNavigator
// ---------------------------------------------------------------------------

/// Surfaces record files through the external viewer, debounced.
pub struct FileNavigator {
    state: Arc<Mutex<NavState>>,
    on_switch: DeferredExecutor<SwitchRequest>,
    on_select: DeferredExecutor<ShowRequest>,
}

impl FileNavigator {
    pub fn new(viewer: Arc<dyn FileViewer>) -> Self {
        let on_switch = DeferredExecutor::new(SWITCH_DEBOUNCE, {
            let viewer = Arc::clone(&viewer);
            move |request: SwitchRequest| {
                let viewer = Arc::clone(&viewer);
                tokio::spawn(async move {
                    // Priority selection happens at fire time, on the file
                    // list captured with the trigger.
                    match choose_priority_file(&request.files) {
                        Some(file_name) => {
                            let file_name = file_name.to_string();
                            if let Err(e) =
                                viewer.show_file(&request.record_id, &file_name).await
                            {
                                tracing::warn!(
                                    record_id = %request.record_id,
                                    file_name,
                                    error = %e,
                                    "Failed to show priority file"
                                );
                            }
                        }
                        None => {
                            if let Err(e) = viewer.clear().await {
                                tracing::warn!(error = %e, "Failed to clear viewer");
                            }
                        }
                    }
                });
            }
        });

        let on_select = DeferredExecutor::trailing_only(SELECT_DEBOUNCE, {
            let viewer = Arc::clone(&viewer);
            move |request: ShowRequest| {
                let viewer = Arc::clone(&viewer);
                tokio::spawn(async move {
                    if let Err(e) = viewer.show_file(&request.record_id, &request.file_name).await
                    {
                        tracing::warn!(
                            record_id = %request.record_id,
                            file_name = request.file_name,
                            error = %e,
                            "Failed to show file"
                        );
                    }
                });
            }
        });

        Self {
            state: Arc::new(Mutex::new(NavState::default())),
            on_switch,
            on_select,
        }
    }

    /// A record became active: remember its files and schedule the deferred
    /// priority-file show (or a viewer clear when the record has none).
    pub fn record_loaded(&self, record_id: RecordId, files: Vec<String>) {
        {
            let mut state = self.lock_state();
            state.record_id = Some(record_id.clone());
            state.files = files.clone();
        }
        self.on_switch.trigger(SwitchRequest { record_id, files });
    }

    /// Explicit selection by 1-indexed position (digit keys 1–9).
    ///
    /// Returns `false` without side effects when the position is out of
    /// range or no record is active.
    pub fn select_position(&self, position: usize) -> bool {
        let request = {
            let state = self.lock_state();
            let Some(record_id) = state.record_id.clone() else {
                return false;
            };
            if position == 0 || position > state.files.len() {
                return false;
            }
            ShowRequest {
                record_id,
                file_name: state.files[position - 1].clone(),
            }
        };
        self.on_select.trigger(request);
        true
    }

    /// Explicit selection by file name (the click path).
    pub fn select_file(&self, file_name: &str) -> bool {
        let request = {
            let state = self.lock_state();
            let Some(record_id) = state.record_id.clone() else {
                return false;
            };
            ShowRequest {
                record_id,
                file_name: file_name.to_string(),
            }
        };
        self.on_select.trigger(request);
        true
    }

    /// Files of the active record, in display order.
    pub fn files(&self) -> Vec<String> {
        self.lock_state().files.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().expect("navigator state lock poisoned")
    }
}
