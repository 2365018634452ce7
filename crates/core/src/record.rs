//! The record model returned by the backend store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bag::AnnotationBag;
use crate::types::RecordId;

/// One subject being browsed and annotated.
///
/// The backend owns the full shape; this engine only cares about the id, the
/// ordered file list, and the annotation bag. Everything else the backend
/// sends (names, dates, contact details, …) lands in `details` for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    #[serde(default)]
    pub name: String,

    /// Link to the subject's external profile, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,

    /// Ordered file list. Position is significant: positions 1–9 map to the
    /// digit-key shortcuts, and the first matching name wins priority-file
    /// selection.
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub extra_data: AnnotationBag,

    /// Free-form display fields the backend attaches to the record.
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
