//! Tesseract engine implementation
//!
//! Local recognition through statically linked Tesseract (tesseract-static,
//! no system dependencies). Warm Tesseract instances live in a bounded
//! [`WorkerPool`]; tessdata for the configured language is resolved once per
//! process and downloaded on first use when no tessdata path is configured.

use crate::config::EngineConfig;
use crate::credentials::CredentialProvider;
use crate::engine::{Engine, EngineResult, LocalRecognition, OcrAdapter};
use crate::error::OcrError;
use crate::payload::ImagePayload;
use crate::pool::WorkerPool;
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tesseract_static::tesseract::Tesseract;
use tokio::sync::OnceCell;

/// One initialized Tesseract instance with its language model loaded
pub struct TesseractWorker {
    tess: Tesseract,
}

impl TesseractWorker {
    fn new(tessdata_path: &str, language: &str) -> Result<Self, OcrError> {
        let tess = Tesseract::new(Some(tessdata_path), Some(language)).map_err(|e| {
            OcrError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        Ok(Self { tess })
    }

    /// Recognize one image. Tesseract consumes itself on failure, so the
    /// worker only comes back when recognition succeeded.
    fn recognize(self, bmp_data: &[u8]) -> Result<(Self, LocalRecognition), OcrError> {
        let tess = self.tess.set_image_from_mem(bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({} bytes): {}",
                bmp_data.len(),
                e
            ))
        })?;

        let mut tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get text: {}", e)))?;

        // Get confidence score (0-100 scale, convert to 0.0-1.0)
        let confidence = tess.mean_text_conf() as f32 / 100.0;

        Ok((Self { tess }, LocalRecognition { text, confidence }))
    }
}

pub struct TesseractAdapter {
    language: String,
    tessdata_path: Option<String>,
    max_workers: usize,
    pool: OnceCell<WorkerPool<TesseractWorker>>,
}

impl TesseractAdapter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            language: config.language.clone(),
            tessdata_path: config.tessdata_path.clone(),
            max_workers: config.local_workers,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&WorkerPool<TesseractWorker>, OcrError> {
        self.pool
            .get_or_try_init(|| async {
                let tessdata_path = match &self.tessdata_path {
                    Some(path) => path.clone(),
                    None => {
                        let language = self.language.clone();
                        tokio::task::spawn_blocking(move || ensure_tessdata_available(&language))
                            .await
                            .map_err(|e| {
                                OcrError::Internal(format!("Tessdata task failed: {}", e))
                            })??
                    }
                };

                tracing::info!(
                    "Tesseract pool ready (tessdata: {}, language: {}, workers: {})",
                    tessdata_path,
                    self.language,
                    self.max_workers
                );

                let language = self.language.clone();
                Ok(WorkerPool::new(self.max_workers, move || {
                    TesseractWorker::new(&tessdata_path, &language)
                }))
            })
            .await
    }
}

#[async_trait]
impl OcrAdapter for TesseractAdapter {
    fn engine(&self) -> Engine {
        Engine::LocalOcr
    }

    async fn recognize(
        &self,
        payload: &ImagePayload,
        _credentials: &dyn CredentialProvider,
    ) -> Result<EngineResult, OcrError> {
        let bmp_data = to_bmp(&payload.to_bytes()?)?;

        let pool = self.pool().await?;
        let mut guard = pool.checkout().await?;
        let worker = guard
            .take()
            .ok_or_else(|| OcrError::Internal("Pooled worker missing".to_string()))?;

        let (worker, recognition) =
            tokio::task::spawn_blocking(move || worker.recognize(&bmp_data))
                .await
                .map_err(|e| OcrError::Internal(format!("Recognition task failed: {}", e)))??;

        guard.restore(worker);
        tracing::debug!("Tesseract pool: {:?}", pool.stats());

        tracing::debug!(
            "Tesseract recognized {} chars, confidence: {:.2}",
            recognition.text.len(),
            recognition.confidence
        );

        Ok(EngineResult::Local(recognition))
    }
}

/// Decode any supported image and re-encode it as BMP, which leptonica
/// always reads
fn to_bmp(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to load image: {}", e)))?;

    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut bmp_data = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut bmp_data);
        rgb_img
            .write_to(&mut cursor, image::ImageFormat::Bmp)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;
    }

    tracing::debug!(
        "Processing image: {}x{}, BMP size: {} bytes",
        width,
        height,
        bmp_data.len()
    );

    Ok(bmp_data)
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure tessdata is available, downloading if needed
fn ensure_tessdata_available(language: &str) -> Result<String, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("capivision-ocr")
        .join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    let traineddata_path = cache_dir.join(format!("{}.traineddata", language));

    if !traineddata_path.exists() {
        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            language
        );
        download_file(&tessdata_url(language), &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    } else {
        tracing::info!("Using cached tessdata from {:?}", cache_dir);
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))
}

fn tessdata_url(language: &str) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download tessdata: {}", e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::InitializationError(format!("Failed to read tessdata response: {}", e))
    })?;

    // Write to a sibling file first so a failed download never leaves a
    // truncated model behind
    let partial = path.with_extension("traineddata.part");
    let mut file = File::create(&partial).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create tessdata file: {}", e))
    })?;
    file.write_all(&buffer).map_err(|e| {
        OcrError::InitializationError(format!("Failed to write tessdata file: {}", e))
    })?;
    std::fs::rename(&partial, path).map_err(|e| {
        OcrError::InitializationError(format!("Failed to move tessdata file: {}", e))
    })?;

    Ok(())
}
