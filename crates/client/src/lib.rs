//! Collaborator boundaries: the record store and file viewer contracts, and
//! their HTTP implementation against the backend REST API.

pub mod config;
pub mod error;
pub mod http;
pub mod traits;

pub use config::ApiConfig;
pub use error::ClientError;
pub use http::HttpApi;
pub use traits::{FileViewer, RecordStore};
