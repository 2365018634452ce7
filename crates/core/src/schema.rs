//! Declarative annotation-field schemas.
//!
//! A deployment ships one fixed list of [`FieldSchema`]s (loaded from JSON or
//! the built-in default). The list is immutable at runtime and not
//! user-editable; the renderer, the shortcut dispatcher, and the synchronizer
//! all key into the annotation bag by `FieldSchema::label`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Input kinds
// ---------------------------------------------------------------------------

/// The closed set of annotation input kinds.
///
/// Adding a kind is a compile-time-checked change: the renderer and the
/// focus/shortcut helpers match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Single-line text entry.
    ShortText,
    /// Numeric entry.
    Numeric,
    /// Date (or date-time) entry.
    DateLike,
    /// Single selection from a dropdown-style option list.
    Select,
    /// Exclusive choice rendered as one control per option.
    ExclusiveChoice,
    /// Multi-line free text block.
    FreeText,
    /// Boolean on/off toggle.
    Toggle,
    /// Reference to a file name.
    FileRef,
    /// Color value in `#RRGGBB` hex.
    Color,
}

impl InputKind {
    /// Return the kind as its schema-file string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::Numeric => "numeric",
            Self::DateLike => "date_like",
            Self::Select => "select",
            Self::ExclusiveChoice => "exclusive_choice",
            Self::FreeText => "free_text",
            Self::Toggle => "toggle",
            Self::FileRef => "file_ref",
            Self::Color => "color",
        }
    }

    /// Kinds that capture ordinary typing while focused.
    ///
    /// Global keyboard shortcuts are suppressed while focus is inside one of
    /// these, so that typing "y" into a note does not also answer a
    /// key-bound question.
    pub fn captures_typing(&self) -> bool {
        match self {
            Self::ShortText | Self::Numeric | Self::DateLike | Self::FreeText => true,
            Self::Select
            | Self::ExclusiveChoice
            | Self::Toggle
            | Self::FileRef
            | Self::Color => false,
        }
    }

    /// Kinds that carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::ExclusiveChoice)
    }
}

// ---------------------------------------------------------------------------
// Field options
// ---------------------------------------------------------------------------

/// One entry in an option list: either a plain value or a value with a bound
/// shortcut key.
///
/// Deserializes from either a bare string or a `{"value": …, "key": …}`
/// object, matching the deployment schema file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Plain(String),
    KeyBound { value: String, key: String },
}

impl FieldOption {
    /// The option's stored value.
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::KeyBound { value, .. } => value,
        }
    }

    /// The bound shortcut key, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::KeyBound { key, .. } => Some(key),
        }
    }
}

// ---------------------------------------------------------------------------
// Field schema
// ---------------------------------------------------------------------------

/// Declarative description of one annotation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Unique key; also the label shown to the caretaker.
    pub label: String,

    pub kind: InputKind,

    /// Ordered option list; only meaningful for option-bearing kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub readonly: bool,

    /// Presentation hint only; never treated as a stored value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSchema {
    /// Create a field with only label and kind; flags default to off.
    pub fn new(label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            label: label.into(),
            kind,
            options: Vec::new(),
            required: false,
            disabled: false,
            readonly: false,
            placeholder: None,
        }
    }

    /// Attach an option list.
    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// Attach a placeholder hint.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a deployment schema.
///
/// Labels must be non-empty and unique; option-bearing kinds must declare at
/// least one option and option-less kinds none; shortcut keys must be a
/// single character and unique within their field.
pub fn validate_schema(fields: &[FieldSchema]) -> Result<(), CoreError> {
    let mut labels = BTreeSet::new();

    for field in fields {
        if field.label.trim().is_empty() {
            return Err(CoreError::Validation(
                "Field label must not be empty".to_string(),
            ));
        }
        if !labels.insert(field.label.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate field label '{}'",
                field.label
            )));
        }

        if field.kind.has_options() {
            if field.options.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Field '{}' is a {} and must declare at least one option",
                    field.label,
                    field.kind.as_str()
                )));
            }
        } else if !field.options.is_empty() {
            return Err(CoreError::Validation(format!(
                "Field '{}' is a {} and must not declare options",
                field.label,
                field.kind.as_str()
            )));
        }

        let mut keys = BTreeSet::new();
        for option in &field.options {
            if let Some(key) = option.key() {
                if key.chars().count() != 1 {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' option '{}' binds key '{key}', which is not a single character",
                        field.label,
                        option.value()
                    )));
                }
                if !keys.insert(key) {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' binds key '{key}' more than once",
                        field.label
                    )));
                }
            }
        }
    }

    Ok(())
}

/// The built-in deployment schema used when no schema file is configured.
pub fn default_schema() -> Vec<FieldSchema> {
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
        FieldSchema::new("Score", InputKind::Numeric),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
