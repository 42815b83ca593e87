//! Credential types for the remote engines
//!
//! Two things live here: the published credential type definitions (pure
//! schema, served as part of the node description) and the capability object
//! the engine dispatcher asks for secrets.

use crate::config::CredentialConfig;
use crate::error::OcrError;
use crate::node::description::NodeProperty;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OCR_SPACE_API: &str = "ocrSpaceApi";
pub const AWS_TEXTRACT_API: &str = "awsTextractApi";

/// Declaration of a named secret set the host must store for the node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub properties: Vec<NodeProperty>,
}

pub fn ocr_space_credential_type() -> CredentialType {
    CredentialType {
        name: OCR_SPACE_API,
        display_name: "OCR.space API",
        documentation_url: "https://ocr.space/ocrapi",
        properties: vec![NodeProperty::secret("API Key", "apiKey", "")
            .describe("API Key do serviço OCR.space")],
    }
}

pub fn aws_textract_credential_type() -> CredentialType {
    CredentialType {
        name: AWS_TEXTRACT_API,
        display_name: "AWS Textract API",
        documentation_url: "https://docs.aws.amazon.com/textract/",
        properties: vec![
            NodeProperty::secret("Access Key ID", "accessKeyId", "")
                .describe("AWS Access Key ID"),
            NodeProperty::secret("Secret Access Key", "secretAccessKey", "")
                .describe("AWS Secret Access Key"),
            NodeProperty::string("Region", "region", "us-east-1")
                .required()
                .describe("AWS Region"),
        ],
    }
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSpaceCredentials {
    pub api_key: String,
}

impl fmt::Debug for OcrSpaceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrSpaceCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsTextractCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl fmt::Debug for AwsTextractCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsTextractCredentials")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Credentials attached to a single execute request by the host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppliedCredentials {
    pub ocr_space_api: Option<OcrSpaceCredentials>,
    pub aws_textract_api: Option<AwsTextractCredentials>,
}

/// Capability handed to engine dispatch for secret lookup
pub trait CredentialProvider: Send + Sync {
    fn ocr_space(&self) -> Result<OcrSpaceCredentials, OcrError>;

    fn aws_textract(&self) -> Result<AwsTextractCredentials, OcrError>;
}

/// Request-supplied credentials first, operator configuration second
pub struct LayeredCredentials<'a> {
    supplied: &'a SuppliedCredentials,
    configured: &'a CredentialConfig,
}

impl<'a> LayeredCredentials<'a> {
    pub fn new(supplied: &'a SuppliedCredentials, configured: &'a CredentialConfig) -> Self {
        Self {
            supplied,
            configured,
        }
    }
}

impl CredentialProvider for LayeredCredentials<'_> {
    fn ocr_space(&self) -> Result<OcrSpaceCredentials, OcrError> {
        self.supplied
            .ocr_space_api
            .as_ref()
            .or(self.configured.ocr_space.as_ref())
            .cloned()
            .ok_or(OcrError::MissingCredentials(OCR_SPACE_API))
    }

    fn aws_textract(&self) -> Result<AwsTextractCredentials, OcrError> {
        self.supplied
            .aws_textract_api
            .as_ref()
            .or(self.configured.aws_textract.as_ref())
            .cloned()
            .ok_or(OcrError::MissingCredentials(AWS_TEXTRACT_API))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> CredentialConfig {
        CredentialConfig {
            ocr_space: Some(OcrSpaceCredentials {
                api_key: "operator-key".to_string(),
            }),
            aws_textract: None,
        }
    }

    #[test]
    fn test_supplied_credentials_take_precedence() {
        let supplied: SuppliedCredentials =
            serde_json::from_str(r#"{"ocrSpaceApi": {"apiKey": "request-key"}}"#).unwrap();
        let configured = configured();
        let provider = LayeredCredentials::new(&supplied, &configured);

        assert_eq!(provider.ocr_space().unwrap().api_key, "request-key");
    }

    #[test]
    fn test_falls_back_to_configured_credentials() {
        let supplied = SuppliedCredentials::default();
        let configured = configured();
        let provider = LayeredCredentials::new(&supplied, &configured);

        assert_eq!(provider.ocr_space().unwrap().api_key, "operator-key");
    }

    #[test]
    fn test_missing_credentials_names_the_type() {
        let supplied = SuppliedCredentials::default();
        let configured = configured();
        let provider = LayeredCredentials::new(&supplied, &configured);

        let err = provider.aws_textract().unwrap_err();
        assert!(matches!(err, OcrError::MissingCredentials(AWS_TEXTRACT_API)));
    }

    #[test]
    fn test_aws_region_defaults() {
        let creds: AwsTextractCredentials =
            serde_json::from_str(r#"{"accessKeyId": "AKIA", "secretAccessKey": "s3cr3t"}"#)
                .unwrap();
        assert_eq!(creds.region, "us-east-1");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = AwsTextractCredentials {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "s3cr3t".to_string(),
            region: "sa-east-1".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("s3cr3t"));
        assert!(!printed.contains("AKIA"));
        assert!(printed.contains("sa-east-1"));
    }

    #[test]
    fn test_credential_type_fields() {
        let aws = aws_textract_credential_type();
        let names: Vec<&str> = aws.properties.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["accessKeyId", "secretAccessKey", "region"]);

        let ocr_space = ocr_space_credential_type();
        assert_eq!(ocr_space.properties.len(), 1);
        assert_eq!(ocr_space.properties[0].name, "apiKey");
    }
}
