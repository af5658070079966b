//! OpenStack Authentication
//!
//! Builds identity v3 token requests from the configured auth type and
//! decodes the token response: the authenticated user and the service
//! catalog every subsystem endpoint is resolved from.

use crate::config::{self, AuthConfig, AuthType};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// One endpoint entry from the token catalog
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}

impl Endpoint {
    fn in_region(&self, region: &str) -> bool {
        region.is_empty()
            || self.region_id.as_deref() == Some(region)
            || self.region.as_deref() == Some(region)
    }
}

/// One service in the token catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Service catalog returned with a token
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog(pub Vec<CatalogEntry>);

impl Catalog {
    /// Find the endpoint URL for the first matching service type
    pub fn endpoint_for(&self, service_types: &[&str], interface: &str, region: &str) -> Result<String> {
        service_types
            .iter()
            .find_map(|service_type| {
                self.0
                    .iter()
                    .filter(|entry| entry.service_type == *service_type)
                    .flat_map(|entry| entry.endpoints.iter())
                    .find(|endpoint| endpoint.interface == interface && endpoint.in_region(region))
                    .map(|endpoint| endpoint.url.clone())
            })
            .ok_or_else(|| Error::EndpointNotFound {
                service_type: service_types.join("|"),
                interface: interface.to_string(),
                region: region.to_string(),
            })
    }
}

/// User the token was issued to
#[derive(Debug, Clone, Deserialize)]
pub struct TokenUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Project the token is scoped to, if any
#[derive(Debug, Clone, Deserialize)]
pub struct TokenProject {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    user: TokenUser,
    #[serde(default)]
    project: Option<TokenProject>,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    catalog: Catalog,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

/// Result of the interactive authentication handshake
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: TokenUser,
    pub project: Option<TokenProject>,
    pub expires_at: Option<DateTime<Utc>>,
    pub catalog: Catalog,
}

impl AuthResult {
    /// Decode a token response body
    pub fn from_response(body: Value) -> Result<Self> {
        let response: TokenResponse = serde_json::from_value(body)
            .map_err(|e| Error::Auth(format!("unexpected token response: {}", e)))?;
        let token = response.token;

        let expires_at = token
            .expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc));

        Ok(Self {
            user: token.user,
            project: token.project,
            expires_at,
            catalog: token.catalog,
        })
    }
}

/// Build the JSON body of a `POST /v3/auth/tokens` request
pub fn token_request(config: &AuthConfig) -> Result<Value> {
    let auth_type = config.auth_type()?;

    let identity = match auth_type {
        AuthType::Password | AuthType::V3Password => password_identity(config)?,
        AuthType::Token | AuthType::V3Token => {
            let token = required(config, config::TOKEN)?;
            json!({ "methods": ["token"], "token": { "id": token } })
        },
        AuthType::V3ApplicationCredential => application_credential_identity(config)?,
    };

    let mut auth = Map::new();
    auth.insert("identity".to_string(), identity);

    // Application credentials carry their own scope
    if auth_type != AuthType::V3ApplicationCredential {
        if let Some(scope) = scope(config) {
            auth.insert("scope".to_string(), scope);
        }
    }

    Ok(json!({ "auth": auth }))
}

fn required<'a>(config: &'a AuthConfig, key: &str) -> Result<&'a str> {
    match config.get(key) {
        "" => Err(Error::Auth(format!("missing required value {:?}", key))),
        value => Ok(value),
    }
}

/// Domain reference from an ID or name key pair, falling back to `defaultDomain`
fn domain(config: &AuthConfig, id_key: &str, name_key: &str) -> Option<Value> {
    match (config.get(id_key), config.get(name_key), config.get(config::DEFAULT_DOMAIN)) {
        (id, _, _) if !id.is_empty() => Some(json!({ "id": id })),
        (_, name, _) if !name.is_empty() => Some(json!({ "name": name })),
        (_, _, default) if !default.is_empty() => Some(json!({ "id": default })),
        _ => None,
    }
}

fn user_reference(config: &AuthConfig) -> Result<Map<String, Value>> {
    let mut user = Map::new();
    match (config.get(config::USER_ID), config.get(config::USERNAME)) {
        (id, _) if !id.is_empty() => {
            user.insert("id".to_string(), json!(id));
        },
        (_, name) if !name.is_empty() => {
            user.insert("name".to_string(), json!(name));
            if let Some(domain) = domain(config, config::USER_DOMAIN_ID, config::USER_DOMAIN_NAME) {
                user.insert("domain".to_string(), domain);
            }
        },
        _ => {
            return Err(Error::Auth(format!(
                "one of {:?} or {:?} is required",
                config::USER_ID,
                config::USERNAME
            )))
        },
    }
    Ok(user)
}

fn password_identity(config: &AuthConfig) -> Result<Value> {
    let mut user = user_reference(config)?;
    user.insert("password".to_string(), json!(required(config, config::PASSWORD)?));
    Ok(json!({ "methods": ["password"], "password": { "user": user } }))
}

fn application_credential_identity(config: &AuthConfig) -> Result<Value> {
    let secret = required(config, config::APPLICATION_CREDENTIAL_SECRET)?;
    let mut credential = Map::new();

    match (
        config.get(config::APPLICATION_CREDENTIAL_ID),
        config.get(config::APPLICATION_CREDENTIAL_NAME),
    ) {
        (id, _) if !id.is_empty() => {
            credential.insert("id".to_string(), json!(id));
        },
        (_, name) if !name.is_empty() => {
            // A credential name is only unique per user
            credential.insert("name".to_string(), json!(name));
            credential.insert("user".to_string(), Value::Object(user_reference(config)?));
        },
        _ => {
            return Err(Error::Auth(format!(
                "one of {:?} or {:?} is required",
                config::APPLICATION_CREDENTIAL_ID,
                config::APPLICATION_CREDENTIAL_NAME
            )))
        },
    }
    credential.insert("secret".to_string(), json!(secret));

    Ok(json!({
        "methods": ["application_credential"],
        "application_credential": credential,
    }))
}

fn scope(config: &AuthConfig) -> Option<Value> {
    if config.get(config::SYSTEM_SCOPE) == "all" {
        return Some(json!({ "system": { "all": true } }));
    }

    let project_id = config.get(config::PROJECT_ID);
    if !project_id.is_empty() {
        return Some(json!({ "project": { "id": project_id } }));
    }

    let project_name = config.get(config::PROJECT_NAME);
    if !project_name.is_empty() {
        let mut project = Map::new();
        project.insert("name".to_string(), json!(project_name));
        if let Some(domain) = domain(config, config::PROJECT_DOMAIN_ID, config::PROJECT_DOMAIN_NAME) {
            project.insert("domain".to_string(), domain);
        }
        return Some(json!({ "project": project }));
    }

    match (config.get(config::DOMAIN_ID), config.get(config::DOMAIN_NAME)) {
        (id, _) if !id.is_empty() => Some(json!({ "domain": { "id": id } })),
        (_, name) if !name.is_empty() => Some(json!({ "domain": { "name": name } })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AuthConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthConfig::new("http://keystone:5000/v3", values)
    }

    #[test]
    fn test_password_request_scoped_by_project_name() {
        let body = token_request(&config(&[
            (config::USERNAME, "admin"),
            (config::PASSWORD, "s3cret"),
            (config::USER_DOMAIN_NAME, "Default"),
            (config::PROJECT_NAME, "acme"),
            (config::PROJECT_DOMAIN_ID, "default"),
        ]))
        .unwrap();

        let identity = &body["auth"]["identity"];
        assert_eq!(identity["methods"], json!(["password"]));
        assert_eq!(identity["password"]["user"]["name"], "admin");
        assert_eq!(identity["password"]["user"]["domain"]["name"], "Default");
        assert_eq!(identity["password"]["user"]["password"], "s3cret");
        assert_eq!(body["auth"]["scope"]["project"]["name"], "acme");
        assert_eq!(body["auth"]["scope"]["project"]["domain"]["id"], "default");
    }

    #[test]
    fn test_default_domain_fills_missing_domains() {
        let body = token_request(&config(&[
            (config::USERNAME, "admin"),
            (config::PASSWORD, "s3cret"),
            (config::PROJECT_NAME, "acme"),
            (config::DEFAULT_DOMAIN, "default"),
        ]))
        .unwrap();

        assert_eq!(body["auth"]["identity"]["password"]["user"]["domain"]["id"], "default");
        assert_eq!(body["auth"]["scope"]["project"]["domain"]["id"], "default");
    }

    #[test]
    fn test_token_request() {
        let body = token_request(&config(&[
            (config::AUTH_TYPE, "v3token"),
            (config::TOKEN, "gAAAA"),
            (config::PROJECT_ID, "p-123"),
        ]))
        .unwrap();

        assert_eq!(body["auth"]["identity"]["token"]["id"], "gAAAA");
        assert_eq!(body["auth"]["scope"]["project"]["id"], "p-123");
    }

    #[test]
    fn test_application_credential_is_never_scoped() {
        let body = token_request(&config(&[
            (config::AUTH_TYPE, "v3applicationcredential"),
            (config::APPLICATION_CREDENTIAL_ID, "ac-1"),
            (config::APPLICATION_CREDENTIAL_SECRET, "shh"),
            (config::PROJECT_NAME, "acme"),
        ]))
        .unwrap();

        let credential = &body["auth"]["identity"]["application_credential"];
        assert_eq!(credential["id"], "ac-1");
        assert_eq!(credential["secret"], "shh");
        assert!(body["auth"].get("scope").is_none());
    }

    #[test]
    fn test_system_scope() {
        let body = token_request(&config(&[
            (config::USER_ID, "u-1"),
            (config::PASSWORD, "pw"),
            (config::SYSTEM_SCOPE, "all"),
            (config::PROJECT_NAME, "ignored"),
        ]))
        .unwrap();
        assert_eq!(body["auth"]["scope"], json!({ "system": { "all": true } }));
    }

    #[test]
    fn test_missing_credentials_fail() {
        assert!(matches!(
            token_request(&config(&[(config::USERNAME, "admin")])),
            Err(Error::Auth(_))
        ));
        assert!(matches!(
            token_request(&config(&[(config::AUTH_TYPE, "token")])),
            Err(Error::Auth(_))
        ));
        assert!(matches!(
            token_request(&config(&[(config::AUTH_TYPE, "saml2")])),
            Err(Error::UnsupportedAuthType(_))
        ));
    }

    #[test]
    fn test_auth_result_and_catalog() {
        let result = AuthResult::from_response(json!({
            "token": {
                "user": {"id": "u-1", "name": "demo"},
                "project": {"id": "p-1", "name": "acme"},
                "expires_at": "2026-10-16T12:00:00.000000Z",
                "catalog": [
                    {"type": "compute", "name": "nova", "endpoints": [
                        {"interface": "internal", "region_id": "RegionOne", "url": "http://internal/compute"},
                        {"interface": "public", "region_id": "RegionTwo", "url": "http://two/compute"},
                        {"interface": "public", "region_id": "RegionOne", "url": "http://one/compute"}
                    ]},
                    {"type": "volumev3", "name": "cinderv3", "endpoints": [
                        {"interface": "public", "region": "RegionOne", "url": "http://one/volume/v3"}
                    ]}
                ]
            }
        }))
        .unwrap();

        assert_eq!(result.user.id, "u-1");
        assert!(result.expires_at.is_some());
        let catalog = &result.catalog;
        assert_eq!(
            catalog.endpoint_for(&["compute"], "public", "RegionOne").unwrap(),
            "http://one/compute"
        );
        assert_eq!(
            catalog.endpoint_for(&["compute"], "public", "").unwrap(),
            "http://two/compute"
        );
        assert_eq!(
            catalog
                .endpoint_for(&["block-storage", "volumev3"], "public", "RegionOne")
                .unwrap(),
            "http://one/volume/v3"
        );
        assert!(matches!(
            catalog.endpoint_for(&["image"], "public", "RegionOne"),
            Err(Error::EndpointNotFound { .. })
        ));
    }
}
