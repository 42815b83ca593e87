//! Layout presets: field name → rectangle on the source image

use serde::Deserialize;
use serde_json::Value;

/// Rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutField {
    pub name: String,
    /// `None` when the preset entry is not a `{x, y, w, h}` object
    pub rect: Option<Rect>,
}

impl LayoutField {
    fn new(name: String, rect: &Value) -> Self {
        Self {
            name,
            rect: serde_json::from_value(rect.clone()).ok(),
        }
    }
}

/// Ordered field list; empty means no structured extraction was requested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPreset {
    fields: Vec<LayoutField>,
}

impl LayoutPreset {
    /// Parse the raw `layoutPreset` parameter.
    ///
    /// The host may hand over either the JSON text or an already decoded
    /// value. Arrays and strings contribute one field per element, named by
    /// its index. Scalars and malformed text degrade to the empty preset;
    /// this never fails.
    pub fn parse(raw: &Value) -> Self {
        let parsed;
        let value = match raw {
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => {
                    parsed = value;
                    &parsed
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed layout preset: {}", e);
                    return Self::default();
                }
            },
            other => other,
        };

        let fields = match value {
            Value::Object(entries) => entries
                .iter()
                .map(|(name, rect)| LayoutField::new(name.clone(), rect))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, rect)| LayoutField::new(index.to_string(), rect))
                .collect(),
            Value::String(text) => (0..text.chars().count())
                .map(|index| LayoutField {
                    name: index.to_string(),
                    rect: None,
                })
                .collect(),
            Value::Null => Vec::new(),
            Value::Bool(_) | Value::Number(_) => {
                tracing::warn!("Ignoring scalar layout preset: {}", value);
                Vec::new()
            }
        };

        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }
}
