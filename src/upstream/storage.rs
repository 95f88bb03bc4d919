//! Protected object retrieval from backend storage.

use bytes::Bytes;
use futures_util::Stream;
use reqwest::{Client, StatusCode};

use crate::config::BackendConfig;
use crate::upstream::UpstreamError;

/// A storage object ready to stream back to the client.
pub struct StoredObject {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    response: reqwest::Response,
}

impl StoredObject {
    /// Consume the object as a byte stream; bytes are never buffered
    /// in full on the gateway.
    pub fn into_byte_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> {
        self.response.bytes_stream()
    }
}

/// Client for the backend storage API.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl StorageClient {
    pub fn new(client: Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            service_key: backend.service_key.clone(),
        }
    }

    /// Fetch the object at `resource_path` (`bucket/object/path`).
    pub async fn fetch_object(&self, resource_path: &str) -> Result<StoredObject, UpstreamError> {
        let path = resource_path.trim_start_matches('/');
        let response = self
            .client
            .get(format!("{}/storage/v1/object/{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(StoredObject {
                content_type: response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                content_length: response.content_length(),
                response,
            }),
            StatusCode::NOT_FOUND => Err(UpstreamError::ObjectMissing(path.to_string())),
            status => Err(UpstreamError::Status(status)),
        }
    }
}
