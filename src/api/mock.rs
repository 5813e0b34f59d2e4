use super::GenerationService;
use crate::models::GenerationRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_IMAGE_SRC: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Scripted answer for [`MockGenerationClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Image(String),
    Service(String),
    Transport(String),
}

pub struct MockGenerationClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    delay: Option<Duration>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    /// Hold each request open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let reply = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Image(MOCK_IMAGE_SRC.to_string())
            } else {
                replies[(requests.len() - 1) % replies.len()].clone()
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            MockReply::Image(src) => Ok(src),
            MockReply::Service(detail) => Err(Error::Service(detail)),
            MockReply::Transport(reason) => Err(Error::Transport(reason)),
        }
    }
}
