use super::{DecodedImage, ImageDecoder};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockImageDecoder {
    decode_count: Arc<Mutex<usize>>,
    sources: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
    delay: Option<Duration>,
}

impl MockImageDecoder {
    pub fn new() -> Self {
        Self {
            decode_count: Arc::new(Mutex::new(0)),
            sources: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            delay: None,
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Sleep before answering, to exercise the second suspension point.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_decode_count(&self) -> usize {
        *self.decode_count.lock().unwrap()
    }

    pub fn decoded_sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }
}

impl Default for MockImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageDecoder for MockImageDecoder {
    async fn decode(&self, src: &str) -> Result<DecodedImage> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        *self.decode_count.lock().unwrap() += 1;
        self.sources.lock().unwrap().push(src.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Decode("Mock decode failure".to_string()));
        }

        Ok(DecodedImage {
            mime: "image/png".to_string(),
            width: 1024,
            height: 1024,
            bytes: src.as_bytes().to_vec(),
        })
    }
}
