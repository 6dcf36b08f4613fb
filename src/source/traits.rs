use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Payload returned by an [`ImageSource`].
pub struct FetchedImage {
    pub bytes: Bytes,
    /// `Content-Type` reported by the upstream, if any.
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Retrieve a fresh copy of the remote image.
    async fn fetch(&self) -> Result<FetchedImage, FetchError>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}
