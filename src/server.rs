use crate::config::Config;
use crate::credentials::{LayeredCredentials, SuppliedCredentials};
use crate::engines::EngineSet;
use crate::error::{ExecutionError, OcrError};
use crate::node::description::{capivision_description, NodeDescription};
use crate::node::items::{InputItem, OutputItem};
use crate::node::params::NodeParameters;
use crate::node::{FailureMode, OcrNode};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<OcrNode>,
    pub config: Arc<Config>,
}

/// Batch execution request, as sent by the workflow host
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub parameters: NodeParameters,
    #[serde(default)]
    pub items: Vec<InputItem>,
    #[serde(default)]
    pub credentials: SuppliedCredentials,
    /// Overrides the server's configured failure mode for this batch
    #[serde(default)]
    pub continue_on_fail: Option<bool>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engines = EngineSet::new(&config.engines)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        node: Arc::new(OcrNode::new(engines)),
        config: Arc::new(config),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .route("/execute", post(handle_execute))
        .route("/health", get(handle_health))
        .route("/description", get(handle_description))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle batch execution requests
async fn handle_execute(
    State(state): State<AppState>,
    request: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<Vec<Vec<OutputItem>>>, Response> {
    let start = Instant::now();

    let Json(request) = request
        .map_err(|e| OcrError::InvalidRequest(e.body_text()).into_response())?;

    let mode = if request
        .continue_on_fail
        .unwrap_or(state.config.continue_on_fail)
    {
        FailureMode::Continue
    } else {
        FailureMode::Abort
    };

    let credentials = LayeredCredentials::new(&request.credentials, &state.config.credentials);

    let outputs = state
        .node
        .execute(&request.items, &request.parameters, &credentials, mode)
        .await
        .map_err(|e: ExecutionError| {
            tracing::warn!("Batch failed at {}", e);
            e.into_response()
        })?;

    tracing::info!(
        "Processed {} item(s) in {}ms",
        outputs.len(),
        start.elapsed().as_millis()
    );

    // Single output port
    Ok(Json(vec![outputs]))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle node description requests
async fn handle_description() -> Json<NodeDescription> {
    Json(capivision_description())
}
