//! Record browsing orchestration.
//!
//! Owns the id list and the current position, and on every record switch
//! drives the synchronizer (annotation state) and the navigator (file
//! preview). Keyboard input is routed here: paging keys, digit keys for file
//! positions, and schema-bound option shortcuts.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use expedient_client::{ClientError, FileViewer, RecordStore};
use expedient_core::keys::{shortcut_updates, FocusContext};
use expedient_core::render::{render_form, RenderedField};
use expedient_core::schema::validate_schema;
use expedient_core::{CoreError, FieldSchema, Record, RecordId};

use crate::navigator::FileNavigator;
use crate::synchronizer::ExtraDataSynchronizer;

#[derive(Default)]
struct BrowserState {
    ids: Vec<RecordId>,
    /// 0-indexed position within `ids`.
    index: usize,
    current: Option<Record>,
    /// Bumped on every record switch; guards against stale record fetches.
    epoch: u64,
    loading: bool,
}

// ---------------------------------------------------------------------------
// RecordBrowser
// ---------------------------------------------------------------------------

/// Steps through the record collection and keeps the annotation and preview
/// machinery pointed at the active record.
pub struct RecordBrowser {
    store: Arc<dyn RecordStore>,
    synchronizer: ExtraDataSynchronizer,
    navigator: FileNavigator,
    schema: Vec<FieldSchema>,
    state: Mutex<BrowserState>,
}

impl RecordBrowser {
    /// Build a browser over the given collaborators and deployment schema.
    ///
    /// The schema is validated up front; a bad deployment schema is a
    /// configuration error, not something to discover at keystroke time.
    pub fn new(
        store: Arc<dyn RecordStore>,
        viewer: Arc<dyn FileViewer>,
        schema: Vec<FieldSchema>,
    ) -> Result<Self, CoreError> {
        validate_schema(&schema)?;
        Ok(Self {
            synchronizer: ExtraDataSynchronizer::new(Arc::clone(&store)),
            navigator: FileNavigator::new(viewer),
            store,
            schema,
            state: Mutex::new(BrowserState::default()),
        })
    }

    /// Fetch the id list and select the starting record.
    ///
    /// When `initial_id` names a known record the session resumes there,
    /// otherwise browsing starts at the first record. An empty collection
    /// leaves the browser idle.
    pub async fn start(&self, initial_id: Option<RecordId>) -> Result<(), ClientError> {
        let ids = self.store.fetch_record_ids().await?;
        let start_index = initial_id
            .and_then(|id| ids.iter().position(|known| *known == id))
            .unwrap_or(0);

        let is_empty = {
            let mut state = self.lock_state();
            state.ids = ids;
            state.index = start_index;
            state.ids.is_empty()
        };

        if !is_empty {
            self.select_index(start_index).await;
        }
        Ok(())
    }

    // -- navigation --------------------------------------------------------

    /// Step to the next record; clamped at the end of the collection.
    pub async fn next(&self) {
        let target = {
            let state = self.lock_state();
            if state.index + 1 >= state.ids.len() {
                return;
            }
            state.index + 1
        };
        self.select_index(target).await;
    }

    /// Step to the previous record; clamped at the start.
    pub async fn previous(&self) {
        let target = {
            let state = self.lock_state();
            if state.index == 0 || state.ids.is_empty() {
                return;
            }
            state.index - 1
        };
        self.select_index(target).await;
    }

    /// Jump to a 1-indexed position; out-of-range positions are ignored.
    pub async fn goto_position(&self, position: usize) {
        if position == 0 {
            return;
        }
        self.select_index(position - 1).await;
    }

    /// Jump to a record by id; unknown ids are ignored.
    pub async fn goto_id(&self, id: &RecordId) {
        let target = {
            let state = self.lock_state();
            state.ids.iter().position(|known| known == id)
        };
        if let Some(index) = target {
            self.select_index(index).await;
        }
    }

    /// Make the record at `index` active: fetch it, then point the
    /// synchronizer and navigator at it. A response that arrives after a
    /// newer switch is discarded; a fetch failure clears the current record
    /// but never blocks further navigation.
    async fn select_index(&self, index: usize) {
        let (id, epoch) = {
            let mut state = self.lock_state();
            if index >= state.ids.len() {
                return;
            }
            state.index = index;
            state.epoch += 1;
            state.loading = true;
            (state.ids[index].clone(), state.epoch)
        };

        match self.store.fetch_record(&id).await {
            Ok(record) => {
                let files = record.files.clone();
                {
                    let mut state = self.lock_state();
                    if state.epoch != epoch {
                        return;
                    }
                    state.current = Some(record);
                    state.loading = false;
                }
                self.navigator.record_loaded(id.clone(), files);
                self.synchronizer.load(id).await;
            }
            Err(e) => {
                tracing::warn!(record_id = %id, error = %e, "Failed to load record");
                let mut state = self.lock_state();
                if state.epoch == epoch {
                    state.current = None;
                    state.loading = false;
                }
            }
        }
    }

    // -- keyboard ----------------------------------------------------------

    /// Route one keypress.
    ///
    /// `PageUp`/`PageDown` page through records. Digit keys 1–9 select the
    /// file at that position (only while focus is outside every control,
    /// matching the preview surface's own suppression rule). Schema option
    /// shortcuts dispatch independently of the digit path, so a digit bound
    /// by a field also answers that field.
    pub async fn handle_key(&self, key: &str, focus: FocusContext) {
        match key {
            "PageUp" => {
                self.previous().await;
                return;
            }
            "PageDown" => {
                self.next().await;
                return;
            }
            _ => {}
        }

        if focus == FocusContext::Outside {
            if let Some(position) = digit_position(key) {
                self.navigator.select_position(position);
            }
        }

        for (label, value) in shortcut_updates(&self.schema, key, focus) {
            self.synchronizer.set_field(&label, Value::String(value));
        }
    }

    // -- annotation passthroughs -------------------------------------------

    pub fn set_field(&self, label: &str, value: Value) {
        self.synchronizer.set_field(label, value);
    }

    pub fn delete_field(&self, label: &str) {
        self.synchronizer.delete_field(label);
    }

    /// Render the annotation form against the current bag.
    pub fn render_form(&self) -> Vec<RenderedField> {
        render_form(&self.schema, &self.synchronizer.bag())
    }

    // -- file passthroughs -------------------------------------------------

    /// Deferred selection of the file at a 1-indexed position.
    pub fn select_file_position(&self, position: usize) -> bool {
        self.navigator.select_position(position)
    }

    /// Deferred selection of a file by name (click path).
    pub fn select_file(&self, file_name: &str) -> bool {
        self.navigator.select_file(file_name)
    }

    // -- accessors ---------------------------------------------------------

    /// The active record, when one is loaded.
    pub fn current_record(&self) -> Option<Record> {
        self.lock_state().current.clone()
    }

    /// `(1-indexed position, total)`; `(0, 0)` for an empty collection.
    pub fn position(&self) -> (usize, usize) {
        let state = self.lock_state();
        if state.ids.is_empty() {
            (0, 0)
        } else {
            (state.index + 1, state.ids.len())
        }
    }

    /// `true` while a record fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock_state().loading
    }

    /// `true` while an annotation persist is in flight.
    pub fn is_saving(&self) -> bool {
        self.synchronizer.is_saving()
    }

    /// Snapshot of the active record's annotation bag.
    pub fn bag(&self) -> expedient_core::AnnotationBag {
        self.synchronizer.bag()
    }

    fn lock_state(&self) -> MutexGuard<'_, BrowserState> {
        self.state.lock().expect("browser state lock poisoned")
    }
}

/// Map a key string to a 1-indexed file position (`"1"`–`"9"`).
fn digit_position(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    let digit = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if ('1'..='9').contains(&digit) {
        Some(digit as usize - '0' as usize)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
