use super::{parse_data_url, sniff_image_mime, DecodedImage, ImageDecoder};
use crate::{Error, Result};
use async_trait::async_trait;

/// Decodes data-URL image sources with the `image` crate.
pub struct DataUrlDecoder;

impl DataUrlDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_sync(bytes: Vec<u8>, declared_mime: String) -> Result<DecodedImage> {
        let img = image::load_from_memory(&bytes)?;
        let mime = sniff_image_mime(&bytes)
            .map(str::to_string)
            .unwrap_or(declared_mime);

        Ok(DecodedImage {
            mime,
            width: img.width(),
            height: img.height(),
            bytes,
        })
    }
}

impl Default for DataUrlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageDecoder for DataUrlDecoder {
    async fn decode(&self, src: &str) -> Result<DecodedImage> {
        let data_url = parse_data_url(src)?;
        tracing::debug!(
            "Decoding {} image ({} bytes)",
            data_url.mime,
            data_url.bytes.len()
        );

        tokio::task::spawn_blocking(move || Self::decode_sync(data_url.bytes, data_url.mime))
            .await
            .map_err(|e| Error::Invariant(format!("Image decode task join error: {}", e)))?
    }
}
