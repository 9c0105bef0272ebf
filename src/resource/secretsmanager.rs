//! Secrets Manager resource properties

use crate::template::ResourceProperties;
use serde::Serialize;

/// How Secrets Manager generates the secret value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerateSecretString {
    pub generate_string_key: String,
    pub password_length: u32,
    pub require_each_included_type: bool,
    pub secret_string_template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Secret {
    pub generate_secret_string: GenerateSecretString,
    pub name: String,
}

impl ResourceProperties for Secret {
    const TYPE: &'static str = "AWS::SecretsManager::Secret";
}
