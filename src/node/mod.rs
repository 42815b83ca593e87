//! The OCR node: reads parameters per record, resolves the image, runs the
//! selected engine and normalizes its result into one output record.

pub mod description;
pub mod items;
pub mod params;

use crate::credentials::CredentialProvider;
use crate::engines::EngineSet;
use crate::error::{ExecutionError, OcrError};
use crate::extractor::OcrExtractor;
use crate::payload::ImagePayload;
use items::{InputItem, OutputItem};
use params::{ItemParameters, NodeParameters};

/// What to do when one record fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// The first failing record fails the whole batch
    Abort,
    /// A failing record yields `{ error }` at its position
    Continue,
}

pub struct OcrNode {
    engines: EngineSet,
    extractor: OcrExtractor,
}

impl OcrNode {
    pub fn new(engines: EngineSet) -> Self {
        Self {
            engines,
            extractor: OcrExtractor::new(),
        }
    }

    /// Process a batch strictly in order, one record at a time.
    ///
    /// Returns exactly one output per input. In [`FailureMode::Abort`] the
    /// outputs gathered so far are discarded on the first error.
    pub async fn execute(
        &self,
        items: &[InputItem],
        parameters: &NodeParameters,
        credentials: &dyn CredentialProvider,
        mode: FailureMode,
    ) -> Result<Vec<OutputItem>, ExecutionError> {
        tracing::info!("Executing OCR node on {} item(s)", items.len());

        let mut outputs = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.process_item(index, item, parameters, credentials).await {
                Ok(output) => outputs.push(output),
                Err(source) => match mode {
                    FailureMode::Abort => return Err(ExecutionError { index, source }),
                    FailureMode::Continue => {
                        tracing::warn!("Item {} failed: {}", index, source);
                        outputs.push(OutputItem::error(source.to_string()));
                    }
                },
            }
        }

        Ok(outputs)
    }

    async fn process_item(
        &self,
        index: usize,
        item: &InputItem,
        parameters: &NodeParameters,
        credentials: &dyn CredentialProvider,
    ) -> Result<OutputItem, OcrError> {
        let params = ItemParameters::read(parameters)?;

        tracing::debug!(
            "Item {}: engine={}, image={:?}, output={}, layout fields={}",
            index,
            params.engine,
            params.image_format,
            params.output_format.as_str(),
            params.layout.fields().len()
        );

        let payload = ImagePayload::resolve(item, params.image_format, &params.base64_field)?;
        let result = self
            .engines
            .dispatch(&params.engine, &payload, credentials)
            .await?;
        if let Some(confidence) = result.confidence() {
            tracing::debug!("Item {}: confidence {:.2}", index, confidence);
        }
        let data = self
            .extractor
            .extract(params.output_format, &result, &params.layout)?;

        Ok(OutputItem::data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BlockKind, Engine, EngineResult, TextBlock, TextractDocument};
    use crate::engines::testing::{FixedAdapter, NoCredentials};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn binary_item(content: &[u8]) -> InputItem {
        serde_json::from_value(json!({
            "json": {},
            "binary": {"data": {"data": STANDARD.encode(content), "mimeType": "image/png"}}
        }))
        .unwrap()
    }

    fn params(value: Value) -> NodeParameters {
        serde_json::from_value(value).unwrap()
    }

    fn node_with_local(local: Arc<FixedAdapter>) -> OcrNode {
        OcrNode::new(EngineSet::from_adapters(
            local,
            FixedAdapter::failing(Engine::HttpOcr, "http not expected"),
            FixedAdapter::failing(Engine::CloudOcr, "cloud not expected"),
        ))
    }

    #[tokio::test]
    async fn test_one_output_per_input_in_order() {
        let local = FixedAdapter::local_text("Texto reconhecido\n");
        let node = node_with_local(local.clone());
        let items = vec![binary_item(b"a"), binary_item(b"b"), binary_item(b"c")];

        let outputs = node
            .execute(
                &items,
                &params(json!({"engine": "local-ocr", "outputFormat": "text"})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(outputs.len(), 3);
        for output in &outputs {
            assert_eq!(output.json, json!({"data": "Texto reconhecido\n"}));
        }
        assert_eq!(local.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_binary_aborts_before_engine_call() {
        let local = FixedAdapter::local_text("never");
        let node = node_with_local(local.clone());
        let items = vec![InputItem::default()];

        let err = node
            .execute(
                &items,
                &params(json!({"engine": "local-ocr"})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap_err();

        assert_eq!(err.index, 0);
        assert_eq!(err.source.to_string(), "Nenhum dado binário encontrado!");
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_discards_earlier_outputs() {
        let local = FixedAdapter::local_text("ok");
        let node = node_with_local(local.clone());
        let items = vec![binary_item(b"a"), InputItem::default(), binary_item(b"c")];

        let err = node
            .execute(&items, &params(json!({})), &NoCredentials, FailureMode::Abort)
            .await
            .unwrap_err();

        assert_eq!(err.index, 1);
        // Third record never ran
        assert_eq!(local.calls(), 1);
    }

    #[tokio::test]
    async fn test_continue_mode_reports_error_in_place() {
        let local = FixedAdapter::local_text("ok");
        let node = node_with_local(local);
        let items = vec![binary_item(b"a"), InputItem::default(), binary_item(b"c")];

        let outputs = node
            .execute(
                &items,
                &params(json!({})),
                &NoCredentials,
                FailureMode::Continue,
            )
            .await
            .unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].json, json!({"data": "ok"}));
        assert_eq!(
            outputs[1].json,
            json!({"error": "Nenhum dado binário encontrado!"})
        );
        assert_eq!(outputs[2].json, json!({"data": "ok"}));
    }

    #[tokio::test]
    async fn test_csv_layout_scenario() {
        let node = node_with_local(FixedAdapter::local_text("anything at all"));

        let outputs = node
            .execute(
                &[binary_item(b"img")],
                &params(json!({
                    "outputFormat": "csv",
                    "layoutPreset": r#"{"name":{"x":0,"y":0,"w":10,"h":5}}"#
                })),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(
            outputs[0].json,
            json!({"data": "name\nValor extraído para name"})
        );
    }

    #[tokio::test]
    async fn test_malformed_layout_behaves_as_empty() {
        let node = node_with_local(FixedAdapter::local_text("plain"));

        let outputs = node
            .execute(
                &[binary_item(b"img")],
                &params(json!({"outputFormat": "json", "layoutPreset": "{bad json"})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(outputs[0].json, json!({"data": {"text": "plain"}}));
    }

    #[tokio::test]
    async fn test_array_layout_uses_index_fields() {
        let node = node_with_local(FixedAdapter::local_text("plain"));

        let outputs = node
            .execute(
                &[binary_item(b"img")],
                &params(json!({"outputFormat": "csv", "layoutPreset": r#"["a"]"#})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(outputs[0].json, json!({"data": "0\nValor extraído para 0"}));
    }

    #[tokio::test]
    async fn test_cloud_engine_base64_mode() {
        let cloud = FixedAdapter::ok(
            Engine::CloudOcr,
            EngineResult::Cloud(TextractDocument {
                blocks: vec![
                    TextBlock {
                        kind: BlockKind::Line,
                        text: Some("linha um".to_string()),
                        confidence: None,
                    },
                    TextBlock {
                        kind: BlockKind::Word,
                        text: Some("um".to_string()),
                        confidence: None,
                    },
                    TextBlock {
                        kind: BlockKind::Line,
                        text: Some("linha dois".to_string()),
                        confidence: None,
                    },
                ],
            }),
        );
        let node = OcrNode::new(EngineSet::from_adapters(
            FixedAdapter::failing(Engine::LocalOcr, "local not expected"),
            FixedAdapter::failing(Engine::HttpOcr, "http not expected"),
            cloud.clone(),
        ));
        let item: InputItem =
            serde_json::from_value(json!({"json": {"scan": "aGVsbG8="}})).unwrap();

        let outputs = node
            .execute(
                &[item],
                &params(json!({
                    "engine": "cloud-ocr",
                    "imageFormat": "base64",
                    "base64Field": "scan"
                })),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(outputs[0].json, json!({"data": "linha um\nlinha dois"}));
        assert_eq!(cloud.calls(), 1);
    }

    #[tokio::test]
    async fn test_adapter_error_propagates_unchanged() {
        let message = "You may only perform this action upto maximum 10 number of times";
        let node = OcrNode::new(EngineSet::from_adapters(
            FixedAdapter::local_text("unused"),
            FixedAdapter::failing(Engine::HttpOcr, message),
            FixedAdapter::failing(Engine::CloudOcr, "unused"),
        ));

        let err = node
            .execute(
                &[binary_item(b"img")],
                &params(json!({"engine": "http-ocr"})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap_err();

        assert_eq!(err.source.to_string(), message);
    }

    #[tokio::test]
    async fn test_unknown_engine_yields_empty_text() {
        let local = FixedAdapter::local_text("unused");
        let node = node_with_local(local.clone());

        let outputs = node
            .execute(
                &[binary_item(b"img")],
                &params(json!({"engine": "abacus"})),
                &NoCredentials,
                FailureMode::Abort,
            )
            .await
            .unwrap();

        assert_eq!(outputs[0].json, json!({"data": ""}));
        assert_eq!(local.calls(), 0);
    }
}
