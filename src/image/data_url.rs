//! `data:` URL encoding and parsing for base64 image payloads.

use crate::{Error, Result};
use base64::Engine as _;

#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Parse a `data:<mime>;base64,<payload>` string.
///
/// Only base64 payloads are accepted; the backend never emits percent-encoded
/// images.
pub fn parse_data_url(src: &str) -> Result<DataUrl> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| Error::Decode("image source is not a data URL".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Decode("data URL has no payload separator".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Decode("data URL payload is not base64".to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Decode(format!("Failed to decode base64 image: {}", e)))?;

    Ok(DataUrl {
        mime: if mime.is_empty() {
            "application/octet-stream".to_string()
        } else {
            mime.to_string()
        },
        bytes,
    })
}
