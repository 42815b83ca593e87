//! OCR engine adapters
//!
//! One adapter per backend. The local Tesseract adapter is conditionally
//! compiled; without the `engine-tesseract` feature `local-ocr` reports
//! itself unavailable instead.

pub mod ocr_space;
pub mod textract;

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

use crate::config::EngineConfig;
use crate::credentials::CredentialProvider;
use crate::engine::{Engine, EngineResult, OcrAdapter};
use crate::error::OcrError;
use crate::payload::ImagePayload;
use std::sync::Arc;

/// The three adapters, dispatched by engine tag
#[derive(Clone)]
pub struct EngineSet {
    local: Arc<dyn OcrAdapter>,
    http: Arc<dyn OcrAdapter>,
    cloud: Arc<dyn OcrAdapter>,
}

impl EngineSet {
    /// Build the adapters for this build. Nothing is downloaded or
    /// contacted here; workers and clients are created on first use.
    pub fn new(config: &EngineConfig) -> Result<Self, OcrError> {
        #[cfg(feature = "engine-tesseract")]
        let local: Arc<dyn OcrAdapter> = {
            tracing::info!(
                "Local engine: tesseract ({} worker(s), language: {})",
                config.local_workers,
                config.language
            );
            Arc::new(tesseract::TesseractAdapter::new(config))
        };

        #[cfg(not(feature = "engine-tesseract"))]
        let local: Arc<dyn OcrAdapter> = {
            tracing::warn!(
                "Local engine not compiled in, ignoring tessdata {:?} and {} worker(s)",
                config.tessdata_path,
                config.local_workers
            );
            Arc::new(UnavailableAdapter)
        };

        let http = Arc::new(ocr_space::OcrSpaceAdapter::new(config)?);
        let cloud = Arc::new(textract::TextractAdapter::new());

        Ok(Self::from_adapters(local, http, cloud))
    }

    pub fn from_adapters(
        local: Arc<dyn OcrAdapter>,
        http: Arc<dyn OcrAdapter>,
        cloud: Arc<dyn OcrAdapter>,
    ) -> Self {
        Self { local, http, cloud }
    }

    /// Run exactly one adapter for `engine`. Unknown tags run nothing.
    pub async fn dispatch(
        &self,
        engine: &Engine,
        payload: &ImagePayload,
        credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError> {
        let adapter = match engine {
            Engine::LocalOcr => &self.local,
            Engine::HttpOcr => &self.http,
            Engine::CloudOcr => &self.cloud,
            Engine::Unrecognized(tag) => {
                tracing::warn!("Unknown engine '{}', producing empty result", tag);
                return Ok(EngineResult::Unrecognized);
            }
        };

        tracing::debug!("Dispatching to {} adapter", adapter.engine());
        adapter.recognize(payload, credentials).await
    }
}

/// Stand-in for the local engine when it is not compiled in
#[cfg(not(feature = "engine-tesseract"))]
struct UnavailableAdapter;

#[cfg(not(feature = "engine-tesseract"))]
#[async_trait::async_trait]
impl OcrAdapter for UnavailableAdapter {
    fn engine(&self) -> Engine {
        Engine::LocalOcr
    }

    async fn recognize(
        &self,
        _payload: &ImagePayload,
        _credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError> {
        Err(OcrError::EngineUnavailable("local-ocr"))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Substitute adapters and credentials for controller tests

    use super::*;
    use crate::credentials::{AwsTextractCredentials, OcrSpaceCredentials};
    use crate::engine::LocalRecognition;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Adapter returning a fixed result and counting its calls
    pub struct FixedAdapter {
        pub engine: Engine,
        pub result: Result<EngineResult, String>,
        pub calls: AtomicUsize,
    }

    impl FixedAdapter {
        pub fn ok(engine: Engine, result: EngineResult) -> Arc<Self> {
            Arc::new(Self {
                engine,
                result: Ok(result),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing(engine: Engine, message: &str) -> Arc<Self> {
            Arc::new(Self {
                engine,
                result: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn local_text(text: &str) -> Arc<Self> {
            Self::ok(
                Engine::LocalOcr,
                EngineResult::Local(LocalRecognition {
                    text: text.to_string(),
                    confidence: 0.95,
                }),
            )
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrAdapter for FixedAdapter {
        fn engine(&self) -> Engine {
            self.engine.clone()
        }

        async fn recognize(
            &self,
            _payload: &ImagePayload,
            _credentials: &dyn CredentialProvider,
        ) -> Result<EngineResult, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(OcrError::Upstream)
        }
    }

    /// Credentials that are never configured
    pub struct NoCredentials;

    impl CredentialProvider for NoCredentials {
        fn ocr_space(&self) -> Result<OcrSpaceCredentials, OcrError> {
            Err(OcrError::MissingCredentials(crate::credentials::OCR_SPACE_API))
        }

        fn aws_textract(&self) -> Result<AwsTextractCredentials, OcrError> {
            Err(OcrError::MissingCredentials(
                crate::credentials::AWS_TEXTRACT_API,
            ))
        }
    }
}
