use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One record flowing into the node
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub json: Map<String, Value>,
    /// Attachments keyed by binary property name, in insertion order
    #[serde(default)]
    pub binary: Option<Map<String, Value>>,
}

/// An attachment as the host serializes it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    /// Base64-encoded file content
    pub data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub file_name: Option<String>,
}

/// One record flowing out of the node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputItem {
    pub json: Value,
}

impl OutputItem {
    pub fn data(data: Value) -> Self {
        Self {
            json: json!({ "data": data }),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            json: json!({ "error": message }),
        }
    }
}
