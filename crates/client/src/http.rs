//! HTTP implementation of the store and viewer contracts.

use std::time::Duration;

use async_trait::async_trait;
use expedient_core::{AnnotationBag, Record, RecordId};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::traits::{FileViewer, RecordStore};

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of the viewer endpoints' responses.
#[derive(Debug, serde::Deserialize)]
struct OkResponse {
    ok: bool,
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// Backend API client implementing both [`RecordStore`] and [`FileViewer`].
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the configured backend.
    pub fn new(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: config.base_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check a response status, mapping 404 to [`ClientError::NotFound`] when
    /// a record id is in play.
    fn check_status(
        response: &reqwest::Response,
        path: &str,
        id: Option<&RecordId>,
    ) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.as_u16() == 404 {
            if let Some(id) = id {
                return Err(ClientError::NotFound(id.clone()));
            }
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for HttpApi {
    async fn fetch_record_ids(&self) -> Result<Vec<RecordId>, ClientError> {
        let path = "/records/ids";
        let response = self.client.get(self.url(path)).send().await?;
        Self::check_status(&response, path, None)?;
        Ok(response.json().await?)
    }

    async fn fetch_record(&self, id: &RecordId) -> Result<Record, ClientError> {
        let path = format!("/records/{id}");
        let response = self.client.get(self.url(&path)).send().await?;
        Self::check_status(&response, &path, Some(id))?;
        Ok(response.json().await?)
    }

    async fn fetch_annotation_bag(&self, id: &RecordId) -> Result<AnnotationBag, ClientError> {
        let path = format!("/records/{id}/data");
        let response = self.client.get(self.url(&path)).send().await?;
        Self::check_status(&response, &path, Some(id))?;
        Ok(response.json().await?)
    }

    async fn persist_annotation_bag(
        &self,
        id: &RecordId,
        bag: &AnnotationBag,
    ) -> Result<(), ClientError> {
        let path = format!("/records/{id}/data");
        tracing::debug!(record_id = %id, fields = bag.len(), "Persisting annotation bag");
        let response = self
            .client
            .put(self.url(&path))
            .json(bag)
            .send()
            .await?;
        Self::check_status(&response, &path, Some(id))?;
        Ok(())
    }
}

#[async_trait]
impl FileViewer for HttpApi {
    async fn show_file(&self, id: &RecordId, file_name: &str) -> Result<(), ClientError> {
        let path = format!("/viewer/show_file/{id}");
        let response = self
            .client
            .get(self.url(&path))
            .query(&[("file_name", file_name)])
            .send()
            .await?;
        Self::check_status(&response, &path, Some(id))?;

        let body: OkResponse = response.json().await?;
        if !body.ok {
            return Err(ClientError::ViewerRefused);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        let path = "/viewer/clear";
        let response = self.client.get(self.url(path)).send().await?;
        Self::check_status(&response, path, None)?;

        let body: OkResponse = response.json().await?;
        if !body.ok {
            return Err(ClientError::ViewerRefused);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
