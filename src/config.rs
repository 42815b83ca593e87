use crate::credentials::{AwsTextractCredentials, OcrSpaceCredentials};
use crate::Args;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    pub engines: EngineConfig,
    pub credentials: CredentialConfig,
    pub continue_on_fail: bool,
}

/// Settings shared by the three engine adapters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub language: String,
    pub tessdata_path: Option<String>,
    pub local_workers: usize,
    pub ocr_space_endpoint: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            tessdata_path: None,
            local_workers: 1,
            ocr_space_endpoint: "https://api.ocr.space/parse/image".to_string(),
        }
    }
}

/// Operator-supplied credentials, used when a request carries none
#[derive(Debug, Clone, Default)]
pub struct CredentialConfig {
    pub ocr_space: Option<OcrSpaceCredentials>,
    pub aws_textract: Option<AwsTextractCredentials>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let ocr_space = args
            .ocr_space_api_key
            .map(|api_key| OcrSpaceCredentials { api_key });

        let aws_textract = match (args.aws_access_key_id, args.aws_secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsTextractCredentials {
                access_key_id,
                secret_access_key,
                region: args.aws_region,
            }),
            _ => None,
        };

        Self {
            host: args.host,
            port: args.port,
            max_body_size: args.max_body_size,
            engines: EngineConfig {
                language: args.ocr_language,
                tessdata_path: args.tessdata_path,
                local_workers: args.local_workers.max(1),
                ocr_space_endpoint: args.ocr_space_endpoint,
            },
            credentials: CredentialConfig {
                ocr_space,
                aws_textract,
            },
            continue_on_fail: args.continue_on_fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_into_config() {
        let args = Args::parse_from([
            "capivision-ocr-server",
            "--port",
            "8080",
            "--local-workers",
            "0",
            "--ocr-space-api-key",
            "k",
            "--aws-access-key-id",
            "AKIA",
            "--aws-secret-access-key",
            "secret",
            "--aws-region",
            "sa-east-1",
            "--continue-on-fail",
        ]);

        let config = Config::from(args);

        assert_eq!(config.port, 8080);
        assert_eq!(config.engines.local_workers, 1);
        assert!(config.continue_on_fail);
        assert_eq!(config.credentials.ocr_space.unwrap().api_key, "k");
        let aws = config.credentials.aws_textract.unwrap();
        assert_eq!(aws.access_key_id, "AKIA");
        assert_eq!(aws.region, "sa-east-1");
    }

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.language, "por");
        assert_eq!(config.local_workers, 1);
        assert!(config.ocr_space_endpoint.ends_with("/parse/image"));
    }
}
