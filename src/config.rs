//! Configuration Management
//!
//! Holds the authentication material a [`Session`](crate::Session) is built
//! from. Values are opaque strings keyed the same way as the provider secret
//! (`username`, `projectName`, `cacert`, ...); a missing key reads as an
//! empty string.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const REGION_NAME: &str = "regionName";
pub const AUTH_TYPE: &str = "authType";
pub const USERNAME: &str = "username";
pub const USER_ID: &str = "userID";
pub const PASSWORD: &str = "password";
pub const APPLICATION_CREDENTIAL_ID: &str = "applicationCredentialID";
pub const APPLICATION_CREDENTIAL_NAME: &str = "applicationCredentialName";
pub const APPLICATION_CREDENTIAL_SECRET: &str = "applicationCredentialSecret";
pub const TOKEN: &str = "token";
pub const SYSTEM_SCOPE: &str = "systemScope";
pub const PROJECT_NAME: &str = "projectName";
pub const PROJECT_ID: &str = "projectID";
pub const USER_DOMAIN_NAME: &str = "userDomainName";
pub const USER_DOMAIN_ID: &str = "userDomainID";
pub const PROJECT_DOMAIN_NAME: &str = "projectDomainName";
pub const PROJECT_DOMAIN_ID: &str = "projectDomainID";
pub const DOMAIN_NAME: &str = "domainName";
pub const DEFAULT_DOMAIN: &str = "defaultDomain";
pub const INSECURE_SKIP_VERIFY: &str = "insecureSkipVerify";
pub const CA_CERT: &str = "cacert";
pub const INTERFACE: &str = "interface";
pub const DOMAIN_ID: &str = "domainID";

/// Supported values of the `authType` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Password,
    V3Password,
    Token,
    V3Token,
    V3ApplicationCredential,
}

impl AuthType {
    /// Parse a configured auth type. An empty value means password auth.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "" | "password" => Ok(AuthType::Password),
            "v3password" => Ok(AuthType::V3Password),
            "token" => Ok(AuthType::Token),
            "v3token" => Ok(AuthType::V3Token),
            "v3applicationcredential" => Ok(AuthType::V3ApplicationCredential),
            other => Err(Error::UnsupportedAuthType(other.to_string())),
        }
    }
}

/// Authentication material for one control-plane
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Identity endpoint, with or without the trailing `/v3`
    pub url: String,
    /// Secret values, looked up by key
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl AuthConfig {
    pub fn new(url: &str, values: HashMap<String, String>) -> Self {
        Self {
            url: url.to_string(),
            values,
        }
    }

    /// Default secret file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("osinv").join("secret.yaml"))
    }

    /// Load configuration from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML (JSON is accepted too)
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Look up a secret value; absent keys read as ""
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Set a value, returning self for chaining
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn auth_type(&self) -> Result<AuthType> {
        AuthType::parse(self.get(AUTH_TYPE))
    }

    /// Whether TLS verification is disabled. Unparsable values mean `false`.
    pub fn insecure_skip_verify(&self) -> bool {
        match self.get(INSECURE_SKIP_VERIFY) {
            "" => false,
            value => parse_bool(value).unwrap_or(false),
        }
    }

    /// Endpoint interface to pick from the catalog
    pub fn interface(&self) -> &str {
        match self.get(INTERFACE) {
            "" => "public",
            interface => interface,
        }
    }
}

/// Accepts the same spellings as a strict boolean parser: 1/t/T/TRUE/true/True and their false forms
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_empty() {
        let config = AuthConfig::new("http://keystone:5000/v3", HashMap::new());
        assert_eq!(config.get(PROJECT_NAME), "");
    }

    #[test]
    fn test_auth_type_defaults_to_password() {
        let config = AuthConfig::default();
        assert_eq!(config.auth_type().unwrap(), AuthType::Password);
    }

    #[test]
    fn test_unsupported_auth_type_carries_value() {
        let config = AuthConfig::default().with(AUTH_TYPE, "v2kerberos");
        match config.auth_type() {
            Err(Error::UnsupportedAuthType(value)) => assert_eq!(value, "v2kerberos"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_insecure_skip_verify() {
        let config = AuthConfig::default();
        assert!(!config.insecure_skip_verify());
        assert!(config.clone().with(INSECURE_SKIP_VERIFY, "true").insecure_skip_verify());
        assert!(config.clone().with(INSECURE_SKIP_VERIFY, "1").insecure_skip_verify());
        assert!(!config.clone().with(INSECURE_SKIP_VERIFY, "yes please").insecure_skip_verify());
    }

    #[test]
    fn test_parse_yaml() {
        let config = AuthConfig::parse(
            r#"
url: https://keystone.example.com:5000/v3
values:
  username: admin
  password: secret
  projectName: acme
  regionName: RegionOne
"#,
        )
        .unwrap();

        assert_eq!(config.url, "https://keystone.example.com:5000/v3");
        assert_eq!(config.get(USERNAME), "admin");
        assert_eq!(config.get(REGION_NAME), "RegionOne");
        assert_eq!(config.interface(), "public");
    }

    #[test]
    fn test_parse_json() {
        let config =
            AuthConfig::parse(r#"{"url": "http://k/v3", "values": {"authType": "v3token"}}"#).unwrap();
        assert_eq!(config.auth_type().unwrap(), AuthType::V3Token);
    }
}
