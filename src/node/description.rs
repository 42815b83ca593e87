//! Node description published to the workflow host
//!
//! Pure schema: display metadata, port arity, credential dependencies and the
//! parameter properties the host renders and later passes back on execute.

use crate::credentials::{
    aws_textract_credential_type, ocr_space_credential_type, CredentialType, AWS_TEXTRACT_API,
    OCR_SPACE_API,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Options,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyOption {
    pub name: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeOptions {
    pub password: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<&'static str, Vec<&'static str>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    pub default: Value,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

impl NodeProperty {
    fn new(
        display_name: &'static str,
        name: &'static str,
        kind: PropertyType,
        default: Value,
    ) -> Self {
        Self {
            display_name,
            name,
            kind,
            options: Vec::new(),
            default,
            required: false,
            description: None,
            type_options: None,
            display_options: None,
        }
    }

    pub fn string(display_name: &'static str, name: &'static str, default: &str) -> Self {
        Self::new(display_name, name, PropertyType::String, json!(default))
    }

    /// A required string rendered as a password input
    pub fn secret(display_name: &'static str, name: &'static str, default: &str) -> Self {
        let mut property = Self::string(display_name, name, default).required();
        property.type_options = Some(TypeOptions { password: true });
        property
    }

    pub fn options(
        display_name: &'static str,
        name: &'static str,
        options: &[(&'static str, &'static str)],
        default: &'static str,
    ) -> Self {
        let mut property = Self::new(display_name, name, PropertyType::Options, json!(default));
        property.options = options
            .iter()
            .map(|&(name, value)| PropertyOption { name, value })
            .collect();
        property
    }

    pub fn json(display_name: &'static str, name: &'static str, default: &str) -> Self {
        Self::new(display_name, name, PropertyType::Json, json!(default))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Only show this property when `parameter` has one of `values`
    pub fn show_when(mut self, parameter: &'static str, values: &[&'static str]) -> Self {
        let mut show = BTreeMap::new();
        show.insert(parameter, values.to_vec());
        self.display_options = Some(DisplayOptions { show });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialDependency {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub group: Vec<&'static str>,
    pub version: u32,
    pub description: &'static str,
    pub defaults: Value,
    pub inputs: Vec<&'static str>,
    pub outputs: Vec<&'static str>,
    pub credentials: Vec<CredentialDependency>,
    pub properties: Vec<NodeProperty>,
    pub credential_types: Vec<CredentialType>,
}

pub fn capivision_description() -> NodeDescription {
    NodeDescription {
        display_name: "CAPIVISION OCR",
        name: "capivisionOcr",
        icon: "file:capivision.svg",
        group: vec!["transform"],
        version: 1,
        description: "OCR multiengine com visão apurada de capivara",
        defaults: json!({ "name": "CAPIVISION OCR" }),
        inputs: vec!["main"],
        outputs: vec!["main"],
        // Optional at node level; each engine branch demands its own set
        credentials: vec![
            CredentialDependency {
                name: OCR_SPACE_API,
                required: false,
            },
            CredentialDependency {
                name: AWS_TEXTRACT_API,
                required: false,
            },
        ],
        properties: vec![
            NodeProperty::options(
                "Mecanismo OCR",
                "engine",
                &[
                    ("Tesseract (local)", "local-ocr"),
                    ("OCR.space", "http-ocr"),
                    ("AWS Textract", "cloud-ocr"),
                ],
                "local-ocr",
            )
            .required(),
            NodeProperty::options(
                "Formato da Imagem",
                "imageFormat",
                &[("Binário", "binary"), ("Base64", "base64")],
                "binary",
            )
            .required(),
            NodeProperty::string("Campo Base64", "base64Field", "data")
                .required()
                .show_when("imageFormat", &["base64"])
                .describe("Nome do campo que contém a imagem em Base64"),
            NodeProperty::options(
                "Formato de Saída",
                "outputFormat",
                &[
                    ("Texto Puro", "text"),
                    ("JSON Estruturado", "json"),
                    ("CSV", "csv"),
                ],
                "text",
            )
            .required(),
            NodeProperty::json("Preset de Layout (opcional)", "layoutPreset", "{}")
                .describe("JSON com estrutura de coordenadas para extração"),
        ],
        credential_types: vec![ocr_space_credential_type(), aws_textract_credential_type()],
    }
}
