use super::GenerationService;
use crate::models::{
    Config, ErrorResponse, GenerationRequest, GenerationResponse, GENERATE_PATH,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct GenerateClient {
    client: Client,
    base_url: String,
}

impl GenerateClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self::new_with_client(config.base_url.clone(), client))
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationService for GenerateClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}{}", self.base_url, GENERATE_PATH);
        tracing::debug!(
            "Sending generation request to {} (image attached: {})",
            url,
            request.image.is_some()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send generation request: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error: ErrorResponse = serde_json::from_str(&body).map_err(|e| {
                tracing::error!("Unreadable error body (status {}): {}", status, body);
                Error::Transport(format!("Failed to parse error response: {}", e))
            })?;
            let detail = error.message();
            tracing::error!("Generation API error (status {}): {}", status, detail);
            return Err(Error::Service(detail));
        }

        let parsed: GenerationResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse generation response: {}", e);
            Error::Transport(format!("Failed to parse generation response: {}", e))
        })?;

        Ok(parsed.image)
    }
}
