//! Global keyboard-shortcut dispatch for option-bearing fields.
//!
//! Option lists may bind single keys; pressing a bound key anywhere outside
//! a text-entry control answers the field. Dispatch is a pure scan over
//! every field's options — O(fields × options) per keystroke, which is fine
//! at deployment schema sizes. Precompute a key → field map here if schemas
//! ever grow past a handful of fields.

use crate::schema::{FieldSchema, InputKind};

// ---------------------------------------------------------------------------
// Focus context
// ---------------------------------------------------------------------------

/// Where keyboard focus currently sits, as reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusContext {
    /// Focus is outside any annotation control.
    Outside,
    /// Focus is inside the control of a field with the given kind.
    Control(InputKind),
    /// Focus is inside a free-form rich-text editing region.
    RichText,
}

impl FocusContext {
    /// Returns `true` when global shortcuts must not fire, because the
    /// keystroke belongs to ordinary typing.
    pub fn suppresses_shortcuts(&self) -> bool {
        match self {
            Self::Outside => false,
            Self::RichText => true,
            Self::Control(kind) => kind.captures_typing(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Resolve a pressed key into `(label, value)` field updates.
///
/// Every field whose options bind the key receives an update — if two fields
/// bind the same key, both answers change. Returns an empty list when the
/// focus context suppresses shortcuts or nothing matches.
pub fn shortcut_updates(
    fields: &[FieldSchema],
    key: &str,
    focus: FocusContext,
) -> Vec<(String, String)> {
    if focus.suppresses_shortcuts() {
        return Vec::new();
    }

    let mut updates = Vec::new();
    for field in fields {
        if !field.kind.has_options() {
            continue;
        }
        for option in &field.options {
            if option.key() == Some(key) {
                updates.push((field.label.clone(), option.value().to_string()));
            }
        }
    }
    updates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
