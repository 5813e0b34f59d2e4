//! Backend integration for the image-generation endpoint
//!
//! Sends a single `POST /api/generate` per action and classifies the
//! outcome as an image source, a service error or a transport error.

pub mod client;
pub mod mock;

pub use client::GenerateClient;
pub use mock::MockGenerationClient;

use crate::models::GenerationRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Returns the displayable image source (a data URL) on success.
    ///
    /// A non-2xx answer maps to [`crate::Error::Service`]; anything that
    /// prevents a well-formed answer maps to a transport-class error.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
