//! OCR.space engine implementation
//!
//! Posts the image as multipart/form-data to the OCR.space parse endpoint.
//! Binary payloads travel as a `file` part, base64 payloads verbatim as the
//! `base64Image` field.

use crate::config::EngineConfig;
use crate::credentials::CredentialProvider;
use crate::engine::{Engine, EngineResult, OcrAdapter, OcrSpaceResponse};
use crate::error::OcrError;
use crate::payload::{guess_upload_name, ImagePayload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

pub struct OcrSpaceAdapter {
    client: Client,
    endpoint: String,
    language: String,
}

impl OcrSpaceAdapter {
    pub fn new(config: &EngineConfig) -> Result<Self, OcrError> {
        let client = Client::builder()
            .user_agent(concat!("capivision-ocr-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OcrError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.ocr_space_endpoint.clone(),
            language: config.language.clone(),
        })
    }

    fn build_form(&self, api_key: String, payload: &ImagePayload) -> Result<Form, OcrError> {
        let form = Form::new()
            .text("apikey", api_key)
            .text("language", self.language.clone());

        match payload {
            ImagePayload::Binary(bytes) => {
                let (file_name, mime) = guess_upload_name(bytes);
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name)
                    .mime_str(mime)
                    .map_err(|e| OcrError::Internal(format!("Invalid MIME type: {}", e)))?;
                Ok(form.part("file", part))
            }
            ImagePayload::Base64(text) => Ok(form.text("base64Image", text.clone())),
        }
    }
}

#[async_trait]
impl OcrAdapter for OcrSpaceAdapter {
    fn engine(&self) -> Engine {
        Engine::HttpOcr
    }

    async fn recognize(
        &self,
        payload: &ImagePayload,
        credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError> {
        let credentials = credentials.ocr_space()?;
        let form = self.build_form(credentials.api_key, payload)?;

        tracing::debug!(
            "Posting {} payload to {}",
            if payload.is_binary() { "binary" } else { "base64" },
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::Upstream(format!("OCR.space request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Upstream(format!(
                "OCR.space request failed: {} - {}",
                status, body
            )));
        }

        let parsed: OcrSpaceResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Upstream(format!("Failed to parse OCR.space response: {}", e)))?;

        if parsed.is_errored_on_processing {
            tracing::warn!(
                "OCR.space reported a processing error (exit code {:?}): {:?}",
                parsed.ocr_exit_code,
                parsed.error_message
            );
        } else {
            tracing::debug!(
                "OCR.space returned {} parsed result(s), exit code {:?}",
                parsed.parsed_results.len(),
                parsed.ocr_exit_code
            );
        }

        Ok(EngineResult::Http(parsed))
    }
}
