use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::{FetchedImage, ImageSource};
use crate::error::FetchError;

pub struct HttpImageSource {
    client: Client,
    url: String,
}

impl HttpImageSource {
    /// Build a source whose requests are bounded by `timeout`.
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self) -> Result<FetchedImage, FetchError> {
        let request_error = |source| FetchError::Request {
            url: self.url.clone(),
            source,
        };

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = resp.status();
        debug!("image fetch status={} url={}", status.as_u16(), self.url);
        if !status.is_success() {
            warn!("image fetch failed status={} url={}", status.as_u16(), self.url);
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = resp.bytes().await.map_err(request_error)?;

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
