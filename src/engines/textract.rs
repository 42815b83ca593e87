//! AWS Textract engine implementation
//!
//! Sends a single synchronous DetectDocumentText request. A client is built
//! per call from the credentials handed in, so different requests may target
//! different accounts and regions.

use crate::credentials::{AwsTextractCredentials, CredentialProvider};
use crate::engine::{BlockKind, Engine, EngineResult, OcrAdapter, TextBlock, TextractDocument};
use crate::error::OcrError;
use crate::payload::ImagePayload;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_textract::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::Blob,
    types::{Block, BlockType, Document},
    Client,
};

#[derive(Debug, Default)]
pub struct TextractAdapter;

impl TextractAdapter {
    pub fn new() -> Self {
        Self
    }

    fn client_for(credentials: &AwsTextractCredentials) -> Client {
        let provider = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            None,
            None,
            "capivision-ocr",
        );

        let config = aws_sdk_textract::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .build();

        Client::from_conf(config)
    }
}

#[async_trait]
impl OcrAdapter for TextractAdapter {
    fn engine(&self) -> Engine {
        Engine::CloudOcr
    }

    async fn recognize(
        &self,
        payload: &ImagePayload,
        credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError> {
        let credentials = credentials.aws_textract()?;
        let bytes = payload.to_bytes()?.into_owned();

        tracing::debug!(
            "Sending {} bytes to Textract in {}",
            bytes.len(),
            credentials.region
        );

        let client = Self::client_for(&credentials);
        let output = client
            .detect_document_text()
            .document(Document::builder().bytes(Blob::new(bytes)).build())
            .send()
            .await
            .map_err(|e| OcrError::Upstream(DisplayErrorContext(&e).to_string()))?;

        Ok(EngineResult::Cloud(document_from_blocks(output.blocks())))
    }
}

fn document_from_blocks(blocks: &[Block]) -> TextractDocument {
    TextractDocument {
        blocks: blocks
            .iter()
            .map(|block| TextBlock {
                kind: match block.block_type() {
                    Some(BlockType::Line) => BlockKind::Line,
                    Some(BlockType::Word) => BlockKind::Word,
                    Some(BlockType::Page) => BlockKind::Page,
                    Some(other) => BlockKind::Other(other.as_str().to_string()),
                    None => BlockKind::Other(String::new()),
                },
                text: block.text().map(str::to_string),
                confidence: block.confidence(),
            })
            .collect(),
    }
}
