//! Configuration Management
//!
//! Handles persistent configuration storage for fsx-ontap-topology.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_VPC_ID: &str = "FSX_ONTAP_VPC_ID";
pub const ENV_DNS_IPS: &str = "FSX_ONTAP_DNS_IPS";
pub const ENV_SERVICE_ACCOUNT_SECRET: &str = "FSX_ONTAP_SERVICE_ACCOUNT_SECRET";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Existing VPC hosting the file system
    #[serde(default, rename = "vpcID")]
    pub vpc_id: Option<String>,
    /// Directory DNS addresses
    #[serde(default, rename = "dnsIPs")]
    pub dns_ips: Option<Vec<String>>,
    /// Secret holding the AD service account bundle
    #[serde(default)]
    pub service_account_secret_name: Option<String>,
    /// Network context cache
    #[serde(default)]
    pub context_file: Option<PathBuf>,
    #[serde(default)]
    pub stack_name: Option<String>,
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fsx-ontap-topology").join("config.json"))
    }

    /// Load configuration from `path`; missing or invalid files give defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective VPC id (config > environment)
    pub fn effective_vpc_id(&self) -> Option<String> {
        self.vpc_id
            .clone()
            .or_else(|| std::env::var(ENV_VPC_ID).ok())
            .filter(|v| !v.is_empty())
    }

    /// Get effective DNS addresses (config > environment)
    pub fn effective_dns_ips(&self) -> Vec<String> {
        self.dns_ips
            .clone()
            .or_else(|| std::env::var(ENV_DNS_IPS).ok().map(|v| parse_list(&v)))
            .unwrap_or_default()
    }

    /// Get effective service account secret name (config > environment)
    pub fn effective_service_account_secret_name(&self) -> Option<String> {
        self.service_account_secret_name
            .clone()
            .or_else(|| std::env::var(ENV_SERVICE_ACCOUNT_SECRET).ok())
            .filter(|v| !v.is_empty())
    }
}

/// Split a comma separated list, dropping blanks
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_context_style_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"vpcID": "vpc-0abc", "dnsIPs": ["10.0.0.10", "10.0.1.10"],
                "serviceAccountSecretName": "ad-svc", "strict": true}"#,
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.effective_vpc_id().as_deref(), Some("vpc-0abc"));
        assert_eq!(config.effective_dns_ips(), vec!["10.0.0.10", "10.0.1.10"]);
        assert_eq!(
            config.effective_service_account_secret_name().as_deref(),
            Some("ad-svc")
        );
        assert!(config.strict);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            vpc_id: Some("vpc-1".to_string()),
            stack_name: Some("Demo".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" 10.0.0.10, ,10.0.1.10 "), vec!["10.0.0.10", "10.0.1.10"]);
        assert!(parse_list("").is_empty());
    }
}
