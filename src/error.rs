use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Nenhum dado binário encontrado!")]
    MissingBinaryData,

    #[error("Field '{0}' does not contain a base64 string")]
    MissingField(String),

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[cfg(not(feature = "engine-tesseract"))]
    #[error("Engine not available in this build: {0}")]
    EngineUnavailable(&'static str),

    #[cfg(feature = "engine-tesseract")]
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[cfg(feature = "engine-tesseract")]
    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Empty OCR result: {0}")]
    EmptyResult(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            OcrError::MissingBinaryData => (StatusCode::BAD_REQUEST, "MISSING_BINARY_DATA"),
            OcrError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            OcrError::InvalidBase64(_) => (StatusCode::BAD_REQUEST, "INVALID_BASE64"),
            OcrError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            OcrError::MissingCredentials(_) => (StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
            #[cfg(not(feature = "engine-tesseract"))]
            OcrError::EngineUnavailable(_) => (StatusCode::NOT_IMPLEMENTED, "ENGINE_UNAVAILABLE"),
            #[cfg(feature = "engine-tesseract")]
            OcrError::InitializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            #[cfg(feature = "engine-tesseract")]
            OcrError::ProcessingError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR"),
            OcrError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            OcrError::EmptyResult(_) => (StatusCode::BAD_GATEWAY, "EMPTY_RESULT"),
            OcrError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            OcrError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// A record failure that aborted the whole batch
#[derive(Error, Debug)]
#[error("item {index}: {source}")]
pub struct ExecutionError {
    pub index: usize,
    #[source]
    pub source: OcrError,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            item_index: None,
        });

        (status, body).into_response()
    }
}

impl IntoResponse for ExecutionError {
    fn into_response(self) -> Response {
        let (status, code) = self.source.status_and_code();

        let body = Json(ErrorResponse {
            error: self.source.to_string(),
            code: code.to_string(),
            item_index: Some(self.index),
        });

        (status, body).into_response()
    }
}
