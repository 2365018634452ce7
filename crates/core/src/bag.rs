//! The extensible annotation data attached to a record.
//!
//! An [`AnnotationBag`] maps field labels to free-form JSON values. Absence
//! of a key means "unset", which is distinct from an explicitly stored empty
//! value — the renderer and the synchronizer both rely on that distinction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field-label → value mapping owned by exactly one record at a time.
///
/// Serializes transparently as a JSON object, matching the `extra_data`
/// payload the backend stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationBag(BTreeMap<String, Value>);

impl AnnotationBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for a label, or `None` when the field is unset.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0.get(label)
    }

    /// Returns `true` when the label has a stored value (even an empty one).
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Store a value for a label, replacing any previous value.
    pub fn set(&mut self, label: impl Into<String>, value: Value) {
        self.0.insert(label.into(), value);
    }

    /// Remove a label entirely, returning the value that was stored.
    ///
    /// Removal makes the field unset again; it does not leave an empty value
    /// behind.
    pub fn remove(&mut self, label: &str) -> Option<Value> {
        self.0.remove(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(label, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for AnnotationBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
