//! Priority-file selection.
//!
//! When a record becomes active the navigator surfaces one file without
//! waiting for the caretaker to pick: the first specially marked file, else
//! the first report, else whatever comes first in list order.

/// Marker for the distinguished assessment files a record may carry.
pub const PRIORITY_MARKER: &str = "Tezza";

/// Case-insensitive marker for report files.
pub const REPORT_MARKER: &str = "informe";

/// Pick the file to surface first for a record, or `None` when the record
/// has no files.
pub fn choose_priority_file(files: &[String]) -> Option<&str> {
    files
        .iter()
        .find(|name| name.contains(PRIORITY_MARKER))
        .or_else(|| {
            files
                .iter()
                .find(|name| name.to_lowercase().contains(REPORT_MARKER))
        })
        .or_else(|| files.first())
        .map(String::as_str)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
