//! Node parameters as sent by the host, and their typed per-record form

use crate::engine::Engine;
use crate::error::OcrError;
use crate::layout::LayoutPreset;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Binary,
    Base64,
}

impl ImageFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "binary" => Some(Self::Binary),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Raw parameter values, defaults matching the published description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParameters {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_image_format")]
    pub image_format: String,
    #[serde(default = "default_base64_field")]
    pub base64_field: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// JSON text, or an already decoded object
    #[serde(default = "default_layout_preset")]
    pub layout_preset: Value,
}

fn default_engine() -> String {
    "local-ocr".to_string()
}

fn default_image_format() -> String {
    "binary".to_string()
}

fn default_base64_field() -> String {
    "data".to_string()
}

fn default_output_format() -> String {
    "text".to_string()
}

fn default_layout_preset() -> Value {
    Value::String("{}".to_string())
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            image_format: default_image_format(),
            base64_field: default_base64_field(),
            output_format: default_output_format(),
            layout_preset: default_layout_preset(),
        }
    }
}

/// Parameters for one record, parsed and validated
#[derive(Debug, Clone)]
pub struct ItemParameters {
    pub engine: Engine,
    pub image_format: ImageFormat,
    pub base64_field: String,
    pub output_format: OutputFormat,
    pub layout: LayoutPreset,
}

impl ItemParameters {
    pub fn read(raw: &NodeParameters) -> Result<Self, OcrError> {
        let image_format = ImageFormat::from_str(&raw.image_format).ok_or_else(|| {
            OcrError::InvalidParameter(format!("imageFormat '{}'", raw.image_format))
        })?;
        let output_format = OutputFormat::from_str(&raw.output_format).ok_or_else(|| {
            OcrError::InvalidParameter(format!("outputFormat '{}'", raw.output_format))
        })?;

        Ok(Self {
            engine: Engine::from_str(&raw.engine),
            image_format,
            base64_field: raw.base64_field.clone(),
            output_format,
            layout: LayoutPreset::parse(&raw.layout_preset),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_description() {
        let raw: NodeParameters = serde_json::from_value(json!({})).unwrap();
        let params = ItemParameters::read(&raw).unwrap();

        assert_eq!(params.engine, Engine::LocalOcr);
        assert_eq!(params.image_format, ImageFormat::Binary);
        assert_eq!(params.base64_field, "data");
        assert_eq!(params.output_format, OutputFormat::Text);
        assert!(params.layout.is_empty());
    }

    #[test]
    fn test_malformed_layout_does_not_fail() {
        let raw: NodeParameters =
            serde_json::from_value(json!({"layoutPreset": "{bad json"})).unwrap();
        let params = ItemParameters::read(&raw).unwrap();
        assert!(params.layout.is_empty());
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        let raw: NodeParameters =
            serde_json::from_value(json!({"outputFormat": "xml"})).unwrap();
        let err = ItemParameters::read(&raw).unwrap_err();
        assert!(matches!(err, OcrError::InvalidParameter(_)));
    }

    #[test]
    fn test_unknown_engine_is_kept_as_tag() {
        let raw: NodeParameters = serde_json::from_value(json!({"engine": "abacus"})).unwrap();
        let params = ItemParameters::read(&raw).unwrap();
        assert_eq!(params.engine, Engine::Unrecognized("abacus".to_string()));
    }
}
