//! Uploads artifacts to an S3-style object storage bucket over HTTP.
//!
//! Each artifact is sent as `POST {storage_url}/object/{bucket}/{key}` with the service key as a
//! bearer token and `x-upsert: true`, so an existing object is replaced in one request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::DestinationError;
use crate::publish::Destination;

pub const DEFAULT_BUCKET: &str = "sitemaps";
pub const DEFAULT_CACHE_CONTROL_S: u64 = 3600;

const CONTENT_TYPE: &str = "application/xml";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ObjectStorageDestination {
    client: Client,
    storage_url: String,
    bucket: String,
    service_key: String,
    cache_control_s: u64,
}

impl ObjectStorageDestination {
    pub fn new(
        client: Client,
        storage_url: &str,
        bucket: &str,
        service_key: &str,
        cache_control_s: u64,
    ) -> Self {
        Self {
            client,
            storage_url: storage_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
            cache_control_s,
        }
    }

    /// Same as `new`, with a client that times out individual uploads.
    pub fn with_default_client(
        storage_url: &str,
        bucket: &str,
        service_key: &str,
        cache_control_s: u64,
    ) -> Result<Self, DestinationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::new(client, storage_url, bucket, service_key, cache_control_s))
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.storage_url, self.bucket, key)
    }

    fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_control_s)
    }
}

#[async_trait]
impl Destination for ObjectStorageDestination {
    async fn put(&self, key: &str, body: &str) -> Result<(), DestinationError> {
        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(reqwest::header::CACHE_CONTROL, self.cache_control())
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DestinationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!("Uploaded {} ({})", key, status);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("bucket '{}' at {}", self.bucket, self.storage_url)
    }
}
