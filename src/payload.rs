//! Image payload resolution
//!
//! Every record yields exactly one payload: the decoded bytes of its first
//! binary attachment, or the base64 text held in a named JSON field.

use crate::error::OcrError;
use crate::node::items::{BinaryData, InputItem};
use crate::node::params::ImageFormat;
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use std::borrow::Cow;

/// Standard alphabet that accepts missing padding and stray trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// Decoded attachment bytes
    Binary(Vec<u8>),
    /// Base64 text taken verbatim from the record
    Base64(String),
}

impl ImagePayload {
    pub fn resolve(
        item: &InputItem,
        format: ImageFormat,
        base64_field: &str,
    ) -> Result<Self, OcrError> {
        match format {
            ImageFormat::Binary => {
                // Attachment map keeps insertion order; the first entry wins
                let (property, entry) = item
                    .binary
                    .as_ref()
                    .and_then(|binary| binary.iter().next())
                    .ok_or(OcrError::MissingBinaryData)?;

                let data: BinaryData = serde_json::from_value(entry.clone()).map_err(|e| {
                    OcrError::InvalidRequest(format!("Binary property '{}': {}", property, e))
                })?;

                let bytes = decode_base64(&data.data)?;

                tracing::debug!(
                    "Using binary property '{}' ({} bytes, {})",
                    property,
                    bytes.len(),
                    data.mime_type.as_deref().unwrap_or("unknown type")
                );

                Ok(Self::Binary(bytes))
            }
            ImageFormat::Base64 => item
                .json
                .get(base64_field)
                .and_then(|value| value.as_str())
                .map(|text| Self::Base64(text.to_string()))
                .ok_or_else(|| OcrError::MissingField(base64_field.to_string())),
        }
    }

    /// Raw image bytes, decoding base64 text when needed
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, OcrError> {
        match self {
            Self::Binary(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Base64(text) => decode_base64(strip_data_url(text)).map(Cow::Owned),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// Decode base64 the way mail and web payloads arrive: line-wrapped,
/// unpadded, or in the URL-safe alphabet
fn decode_base64(text: &str) -> Result<Vec<u8>, OcrError> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    LENIENT
        .decode(normalized)
        .map_err(|e| OcrError::InvalidBase64(e.to_string()))
}

/// Drop a leading `data:<mime>;base64,` prefix
fn strip_data_url(text: &str) -> &str {
    if text.starts_with("data:") {
        if let Some(pos) = text.find(";base64,") {
            return &text[pos + ";base64,".len()..];
        }
    }
    text
}

/// File name and MIME type for an upload, sniffed from magic bytes
pub fn guess_upload_name(bytes: &[u8]) -> (&'static str, &'static str) {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => ("image.png", "image/png"),
        Ok(image::ImageFormat::Jpeg) => ("image.jpg", "image/jpeg"),
        Ok(image::ImageFormat::Gif) => ("image.gif", "image/gif"),
        Ok(image::ImageFormat::Bmp) => ("image.bmp", "image/bmp"),
        Ok(image::ImageFormat::WebP) => ("image.webp", "image/webp"),
        Ok(image::ImageFormat::Tiff) => ("image.tiff", "image/tiff"),
        _ if bytes.starts_with(b"%PDF-") => ("document.pdf", "application/pdf"),
        _ => ("image.png", "application/octet-stream"),
    }
}
