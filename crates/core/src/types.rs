/// Record identifiers are opaque strings assigned by the backend store.
pub type RecordId = String;
