// Helpers shared by the integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use todo_app::error::FetchError;
use todo_app::source::traits::{FetchedImage, ImageSource};

pub const MINUTE: Duration = Duration::from_secs(60);

/// JPEG-looking payload with a recognizable tag.
pub fn jpeg_bytes(tag: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend(std::iter::repeat(tag).take(256));
    data
}

/// Backdate the file's modification time by `age`.
pub fn set_age(path: &Path, age: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

/// In-process image source that counts calls and can be told to fail.
pub struct FakeSource {
    calls: AtomicUsize,
    response: Mutex<Result<Bytes, String>>,
    delay: Duration,
}

impl FakeSource {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(Ok(Bytes::from(payload))),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        let source = Self::new(Vec::new());
        source.fail_with(message);
        source
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_with(&self, message: &str) {
        *self.response.lock() = Err(message.to_string());
    }

    pub fn respond_with(&self, payload: Vec<u8>) {
        *self.response.lock() = Ok(Bytes::from(payload));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSource for FakeSource {
    async fn fetch(&self) -> Result<FetchedImage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let response = self.response.lock().clone();
        match response {
            Ok(bytes) => Ok(FetchedImage {
                bytes,
                content_type: Some("image/jpeg".to_string()),
            }),
            Err(message) => Err(FetchError::Unavailable(message)),
        }
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}
