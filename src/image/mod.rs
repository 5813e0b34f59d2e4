//! Image decoding and data-URL handling
//!
//! The backend returns generated images as data URLs and accepts reference
//! images the same way. This module turns files into data URLs and decodes
//! returned sources before they are rendered.

pub mod data_url;
pub mod decoder;
pub mod mime;
pub mod mock;

pub use data_url::{encode_data_url, parse_data_url, DataUrl};
pub use decoder::DataUrlDecoder;
pub use mime::sniff_image_mime;
pub use mock::MockImageDecoder;

use crate::Result;
use async_trait::async_trait;

/// An image source that decoded successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension matching the image's MIME type.
    pub fn extension(&self) -> &'static str {
        mime::extension_for(&self.mime)
    }
}

#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, src: &str) -> Result<DecodedImage>;
}
