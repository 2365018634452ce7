//! Domain types and pure logic for the record annotation engine.
//!
//! This crate has no internal dependencies so that the client, sync, and any
//! future tooling crates can all share the same schema types, the annotation
//! bag, and the pure helpers (priority-file selection, shortcut dispatch,
//! form rendering).

pub mod bag;
pub mod error;
pub mod files;
pub mod keys;
pub mod record;
pub mod render;
pub mod schema;
pub mod types;

pub use bag::AnnotationBag;
pub use error::CoreError;
pub use record::Record;
pub use schema::{FieldOption, FieldSchema, InputKind};
pub use types::RecordId;
