//! Result normalization
//!
//! Turns an engine result into one of the three output shapes. All functions
//! here are pure: the same result and layout always give the same bytes.

use crate::engine::{BlockKind, EngineResult};
use crate::error::OcrError;
use crate::layout::LayoutPreset;
use crate::node::params::OutputFormat;
use serde_json::{Map, Value};

/// Value extracted for one layout field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Region-bounded extraction is not implemented; the field carries a
    /// fixed placeholder instead of text read from its rectangle.
    Unsupported { field: String },
}

impl FieldValue {
    pub fn render(&self) -> String {
        match self {
            FieldValue::Unsupported { field } => format!("Valor extraído para {}", field),
        }
    }
}

/// Either the whole text, or one value per layout field
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Text(String),
    Fields(Vec<(String, FieldValue)>),
}

impl Structured {
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        match self {
            Structured::Text(text) => {
                object.insert("text".to_string(), Value::String(text.clone()));
            }
            Structured::Fields(fields) => {
                for (name, value) in fields {
                    object.insert(name.clone(), Value::String(value.render()));
                }
            }
        }
        Value::Object(object)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OcrExtractor;

impl OcrExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Plain text of an engine result
    pub fn extract_text(&self, result: &EngineResult) -> Result<String, OcrError> {
        match result {
            EngineResult::Local(recognition) => Ok(recognition.text.clone()),
            EngineResult::Http(response) => response
                .parsed_results
                .first()
                .map(|parsed| parsed.parsed_text.clone())
                .ok_or_else(|| {
                    let reason = match &response.error_message {
                        Some(Value::String(message)) if !message.is_empty() => message.clone(),
                        Some(Value::Array(messages)) if !messages.is_empty() => messages
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join("; "),
                        _ => "ParsedResults is empty".to_string(),
                    };
                    OcrError::EmptyResult(reason)
                }),
            EngineResult::Cloud(document) => Ok(document
                .blocks
                .iter()
                .filter(|block| block.kind == BlockKind::Line)
                .map(|block| block.text.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\n")),
            EngineResult::Unrecognized => Ok(String::new()),
        }
    }

    /// Text wrapped as `{text}` when the layout is empty, otherwise one
    /// value per layout field in layout order
    pub fn extract_structured(
        &self,
        result: &EngineResult,
        layout: &LayoutPreset,
    ) -> Result<Structured, OcrError> {
        let text = self.extract_text(result)?;
        if layout.is_empty() {
            return Ok(Structured::Text(text));
        }

        let fields = layout
            .fields()
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    FieldValue::Unsupported {
                        field: field.name.clone(),
                    },
                )
            })
            .collect();

        Ok(Structured::Fields(fields))
    }

    pub fn extract_json(
        &self,
        result: &EngineResult,
        layout: &LayoutPreset,
    ) -> Result<Value, OcrError> {
        Ok(self.extract_structured(result, layout)?.to_json())
    }

    /// Header line of field names and one value line, comma-joined without
    /// quoting. An empty layout yields the bare text.
    pub fn extract_csv(
        &self,
        result: &EngineResult,
        layout: &LayoutPreset,
    ) -> Result<String, OcrError> {
        match self.extract_structured(result, layout)? {
            Structured::Text(text) => Ok(text),
            Structured::Fields(fields) => {
                let headers: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
                let values: Vec<String> = fields.iter().map(|(_, value)| value.render()).collect();
                Ok(format!("{}\n{}", headers.join(","), values.join(",")))
            }
        }
    }

    pub fn extract(
        &self,
        format: OutputFormat,
        result: &EngineResult,
        layout: &LayoutPreset,
    ) -> Result<Value, OcrError> {
        match format {
            OutputFormat::Text => self.extract_text(result).map(Value::String),
            OutputFormat::Json => self.extract_json(result, layout),
            OutputFormat::Csv => self.extract_csv(result, layout).map(Value::String),
        }
    }
}
