//! Reference-image capture
//!
//! Reads a local file into a data URL so it can ride along with a
//! generation request. Files are checked for size and for a known image
//! signature before they are accepted.

use crate::image::{encode_data_url, sniff_image_mime};
use crate::models::DEFAULT_MAX_UPLOAD_BYTES;
use crate::{Error, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime: String,
    pub byte_len: u64,
    pub data_url: String,
}

#[derive(Debug, Clone)]
pub struct ImageCapture {
    max_bytes: u64,
}

impl ImageCapture {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub async fn read(&self, path: &Path) -> Result<CapturedImage> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::InvalidUpload(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        // The file may have grown between stat and read.
        self.check_size(bytes.len() as u64)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.capture_bytes(file_name, &bytes)
    }

    pub fn capture_bytes(&self, file_name: String, bytes: &[u8]) -> Result<CapturedImage> {
        self.check_size(bytes.len() as u64)?;

        let mime = sniff_image_mime(bytes).ok_or_else(|| {
            Error::InvalidUpload(format!(
                "{} is not a PNG, JPEG, WebP or GIF image",
                file_name
            ))
        })?;

        tracing::info!(
            "Captured reference image {} ({}, {} bytes)",
            file_name,
            mime,
            bytes.len()
        );

        Ok(CapturedImage {
            file_name,
            mime: mime.to_string(),
            byte_len: bytes.len() as u64,
            data_url: encode_data_url(mime, bytes),
        })
    }

    fn check_size(&self, len: u64) -> Result<()> {
        if len == 0 {
            return Err(Error::InvalidUpload("image file is empty".to_string()));
        }
        if len > self.max_bytes {
            return Err(Error::InvalidUpload(format!(
                "image is {} bytes, limit is {} bytes",
                len, self.max_bytes
            )));
        }
        Ok(())
    }
}

impl Default for ImageCapture {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}
