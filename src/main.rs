use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod credentials;
mod engine;
mod engines;
mod error;
mod extractor;
mod layout;
mod node;
mod payload;
#[cfg(feature = "engine-tesseract")]
mod pool;
mod server;

#[derive(Parser, Debug)]
#[command(name = "capivision-ocr-server")]
#[command(about = "Multi-engine OCR workflow node (Tesseract, OCR.space, AWS Textract)")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "CAPIVISION_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CAPIVISION_PORT", default_value = "9393")]
    pub port: u16,

    /// Maximum request body size in bytes (default: 50MB)
    #[arg(long, env = "CAPIVISION_MAX_BODY_SIZE", default_value = "52428800")]
    pub max_body_size: usize,

    /// Recognition language sent to the local engine and OCR.space
    #[arg(long, env = "CAPIVISION_OCR_LANGUAGE", default_value = "por")]
    pub ocr_language: String,

    /// Path to tessdata directory (downloaded to the cache dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Maximum number of warm local recognition workers
    #[arg(long, env = "CAPIVISION_LOCAL_WORKERS", default_value = "1")]
    pub local_workers: usize,

    /// OCR.space parse endpoint
    #[arg(
        long,
        env = "OCR_SPACE_ENDPOINT",
        default_value = "https://api.ocr.space/parse/image"
    )]
    pub ocr_space_endpoint: String,

    /// OCR.space API key used when a request carries no credentials
    #[arg(long, env = "OCR_SPACE_API_KEY", hide_env_values = true)]
    pub ocr_space_api_key: Option<String>,

    /// AWS access key id used for Textract
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key used for Textract
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// AWS region used for Textract
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub aws_region: String,

    /// Emit an error record for a failing item instead of failing the batch
    #[arg(long, env = "CAPIVISION_CONTINUE_ON_FAIL")]
    pub continue_on_fail: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!(
        "Starting capivision-ocr-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
