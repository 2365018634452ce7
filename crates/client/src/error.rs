use expedient_core::RecordId;

/// Error type for backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    /// The requested record does not exist.
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// The viewer accepted the request but reported it could not act on it.
    #[error("Viewer refused the request")]
    ViewerRefused,
}
