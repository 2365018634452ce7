//! Schema-driven form rendering.
//!
//! Pure mapping from a [`FieldSchema`] plus the current [`AnnotationBag`]
//! value to a displayable control view-model. The bag is the single source of
//! truth for "has this been answered": an unset field always renders its
//! kind-appropriate neutral default, never the schema placeholder and never a
//! declared option, so a blank answer can't masquerade as a stored one.

use serde::Serialize;
use serde_json::Value;

use crate::bag::AnnotationBag;
use crate::schema::{FieldSchema, InputKind};

/// Display-only default for unset color fields; never written to the bag.
pub const NEUTRAL_COLOR: &str = "#000000";

// ---------------------------------------------------------------------------
// View-model types
// ---------------------------------------------------------------------------

/// An option as presented to the caretaker, with its shortcut key if bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A displayable control, one variant per [`InputKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    TextBox {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    NumberBox {
        /// `None` renders as an empty numeric entry.
        value: Option<f64>,
    },
    DateBox {
        value: String,
    },
    SelectBox {
        options: Vec<ChoiceOption>,
        /// `None` renders the empty "-- Select --" state.
        selected: Option<String>,
    },
    ChoiceGroup {
        options: Vec<ChoiceOption>,
        selected: Option<String>,
    },
    TextArea {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    FilePicker {
        /// Previously stored file name, if any.
        file_name: Option<String>,
    },
    ColorSwatch {
        value: String,
    },
}

/// One fully rendered annotation field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub label: String,
    pub required: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub control: Control,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render one field against the current bag state.
pub fn render_field(field: &FieldSchema, bag: &AnnotationBag) -> RenderedField {
    let stored = bag.get(&field.label);

    let control = match field.kind {
        InputKind::ShortText => Control::TextBox {
            value: stored.map(value_text).unwrap_or_default(),
            placeholder: field.placeholder.clone(),
        },
        InputKind::Numeric => Control::NumberBox {
            value: stored.and_then(value_number),
        },
        InputKind::DateLike => Control::DateBox {
            value: stored.map(value_text).unwrap_or_default(),
        },
        InputKind::Select => Control::SelectBox {
            options: choice_options(field),
            selected: selected_option(field, stored),
        },
        InputKind::ExclusiveChoice => Control::ChoiceGroup {
            options: choice_options(field),
            selected: selected_option(field, stored),
        },
        InputKind::FreeText => Control::TextArea {
            value: stored.map(value_text).unwrap_or_default(),
            placeholder: field.placeholder.clone(),
        },
        InputKind::Toggle => Control::Checkbox {
            checked: stored.is_some_and(value_truthy),
        },
        InputKind::FileRef => Control::FilePicker {
            file_name: stored.and_then(|v| v.as_str().map(str::to_string)),
        },
        InputKind::Color => Control::ColorSwatch {
            value: stored
                .map(value_text)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NEUTRAL_COLOR.to_string()),
        },
    };

    RenderedField {
        label: field.label.clone(),
        required: field.required,
        disabled: field.disabled,
        readonly: field.readonly,
        control,
    }
}

/// Render the whole form in schema order.
pub fn render_form(fields: &[FieldSchema], bag: &AnnotationBag) -> Vec<RenderedField> {
    fields.iter().map(|field| render_field(field, bag)).collect()
}

// ---------------------------------------------------------------------------
// Value coercions
// ---------------------------------------------------------------------------

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn choice_options(field: &FieldSchema) -> Vec<ChoiceOption> {
    field
        .options
        .iter()
        .map(|option| ChoiceOption {
            value: option.value().to_string(),
            key: option.key().map(str::to_string),
        })
        .collect()
}

/// A selection only counts when the stored value matches a declared option;
/// anything else renders as the empty selection.
fn selected_option(field: &FieldSchema, stored: Option<&Value>) -> Option<String> {
    let value = stored?.as_str()?;
    field
        .options
        .iter()
        .any(|option| option.value() == value)
        .then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
