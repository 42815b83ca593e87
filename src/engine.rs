use crate::credentials::CredentialProvider;
use crate::error::OcrError;
use crate::payload::ImagePayload;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// OCR backend selected by the `engine` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    /// Local Tesseract recognition
    LocalOcr,
    /// OCR.space HTTP API
    HttpOcr,
    /// AWS Textract document text detection
    CloudOcr,
    /// Any other tag; runs no engine and normalizes to empty text
    Unrecognized(String),
}

impl Engine {
    /// Parse the `engine` parameter. The host values of the first plugin
    /// release (`tesseract`, `ocrspace`, `textract`) are accepted too.
    pub fn from_str(s: &str) -> Self {
        match s {
            "local-ocr" | "tesseract" => Self::LocalOcr,
            "http-ocr" | "ocrspace" => Self::HttpOcr,
            "cloud-ocr" | "textract" => Self::CloudOcr,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LocalOcr => "local-ocr",
            Self::HttpOcr => "http-ocr",
            Self::CloudOcr => "cloud-ocr",
            Self::Unrecognized(tag) => tag,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of one engine call, one variant per backend
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResult {
    Local(LocalRecognition),
    Http(OcrSpaceResponse),
    Cloud(TextractDocument),
    Unrecognized,
}

impl EngineResult {
    /// Engine-reported confidence, 0.0-1.0, where the engine has one.
    /// Textract reports per block; this is the mean over `LINE` blocks.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            EngineResult::Local(recognition) => Some(recognition.confidence),
            EngineResult::Cloud(document) => {
                let scores: Vec<f32> = document
                    .blocks
                    .iter()
                    .filter(|block| block.kind == BlockKind::Line)
                    .filter_map(|block| block.confidence)
                    .collect();
                if scores.is_empty() {
                    None
                } else {
                    Some(scores.iter().sum::<f32>() / scores.len() as f32 / 100.0)
                }
            }
            EngineResult::Http(_) | EngineResult::Unrecognized => None,
        }
    }
}

/// Output of a local Tesseract run
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecognition {
    pub text: String,
    /// Mean word confidence, 0.0-1.0
    pub confidence: f32,
}

/// Body returned by the OCR.space parse endpoint
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrSpaceResponse {
    #[serde(default)]
    pub parsed_results: Vec<ParsedResult>,
    #[serde(rename = "OCRExitCode", default)]
    pub ocr_exit_code: Option<i64>,
    #[serde(default)]
    pub is_errored_on_processing: bool,
    /// String or array of strings, depending on the failure
    #[serde(default)]
    pub error_message: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    #[serde(default)]
    pub parsed_text: String,
}

/// Blocks returned by a Textract document text detection call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextractDocument {
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: Option<String>,
    /// 0-100, as Textract reports it
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Page,
    Line,
    Word,
    Other(String),
}

/// One OCR backend
#[async_trait]
pub trait OcrAdapter: Send + Sync {
    /// Returns the engine this adapter serves
    fn engine(&self) -> Engine;

    /// Run recognition against one image payload
    async fn recognize(
        &self,
        payload: &ImagePayload,
        credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_parsing_accepts_aliases() {
        assert_eq!(Engine::from_str("local-ocr"), Engine::LocalOcr);
        assert_eq!(Engine::from_str("tesseract"), Engine::LocalOcr);
        assert_eq!(Engine::from_str("http-ocr"), Engine::HttpOcr);
        assert_eq!(Engine::from_str("ocrspace"), Engine::HttpOcr);
        assert_eq!(Engine::from_str("cloud-ocr"), Engine::CloudOcr);
        assert_eq!(Engine::from_str("textract"), Engine::CloudOcr);
        assert_eq!(
            Engine::from_str("paper"),
            Engine::Unrecognized("paper".to_string())
        );
    }

    #[test]
    fn test_ocr_space_response_deserializes() {
        let body = r#"{
            "ParsedResults": [
                {"TextOverlay": {"Lines": []}, "FileParseExitCode": 1, "ParsedText": "Olá\r\nmundo", "ErrorMessage": ""}
            ],
            "OCRExitCode": 1,
            "IsErroredOnProcessing": false,
            "ProcessingTimeInMilliseconds": "343"
        }"#;
        let response: OcrSpaceResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.parsed_results.len(), 1);
        assert_eq!(response.parsed_results[0].parsed_text, "Olá\r\nmundo");
        assert_eq!(response.ocr_exit_code, Some(1));
        assert!(!response.is_errored_on_processing);
    }

    #[test]
    fn test_ocr_space_error_response_deserializes() {
        let body = r#"{
            "OCRExitCode": 99,
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["Unable to recognize the file type"]
        }"#;
        let response: OcrSpaceResponse = serde_json::from_str(body).unwrap();

        assert!(response.parsed_results.is_empty());
        assert!(response.is_errored_on_processing);
        assert!(response.error_message.is_some());
    }

    #[test]
    fn test_confidence_per_engine() {
        let local = EngineResult::Local(LocalRecognition {
            text: String::new(),
            confidence: 0.75,
        });
        assert_eq!(local.confidence(), Some(0.75));

        let line = |confidence| TextBlock {
            kind: BlockKind::Line,
            text: None,
            confidence: Some(confidence),
        };
        let cloud = EngineResult::Cloud(TextractDocument {
            blocks: vec![
                line(90.0),
                line(70.0),
                TextBlock {
                    kind: BlockKind::Word,
                    text: None,
                    confidence: Some(10.0),
                },
            ],
        });
        assert_eq!(cloud.confidence(), Some(0.8));

        assert_eq!(EngineResult::Http(OcrSpaceResponse::default()).confidence(), None);
    }
}
