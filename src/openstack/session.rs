//! OpenStack Session
//!
//! One authenticated handle to the control-plane plus an endpoint handle for
//! each subsystem. A session is built once and never mutated afterwards, so
//! clones can be used from concurrent tasks.

use super::auth::{self, AuthResult, Catalog};
use super::http::OpenStackHttpClient;
use crate::config::{self, AuthConfig};
use crate::error::{Error, Result};
use crate::resource::ScopeContext;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Logical API surface within the control-plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Identity,
    Compute,
    Image,
    Network,
    BlockStorage,
}

impl Subsystem {
    /// Catalog service types, in order of preference
    fn service_types(self) -> &'static [&'static str] {
        match self {
            Subsystem::Identity => &["identity"],
            Subsystem::Compute => &["compute"],
            Subsystem::Image => &["image"],
            Subsystem::Network => &["network"],
            Subsystem::BlockStorage => &["block-storage", "volumev3"],
        }
    }

    /// API version segment appended when the catalog URL lacks it
    fn version_suffix(self) -> Option<&'static str> {
        match self {
            Subsystem::Identity => Some("v3"),
            Subsystem::Image => Some("v2"),
            Subsystem::Network => Some("v2.0"),
            Subsystem::Compute | Subsystem::BlockStorage => None,
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subsystem::Identity => "identity",
            Subsystem::Compute => "compute",
            Subsystem::Image => "image",
            Subsystem::Network => "network",
            Subsystem::BlockStorage => "block-storage",
        };
        f.write_str(name)
    }
}

/// Versioned base URL of one subsystem, always ending in `/`
#[derive(Debug, Clone)]
pub struct ServiceClient {
    pub subsystem: Subsystem,
    pub base: Url,
}

impl ServiceClient {
    fn new(subsystem: Subsystem, endpoint: &str) -> Result<Self> {
        Ok(Self {
            subsystem,
            base: resource_base(endpoint, subsystem.version_suffix())?,
        })
    }

    /// Build a URL for a path relative to the versioned base
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::Config(format!("invalid {} path {:?}: {}", self.subsystem, path, e)))
    }
}

/// Normalize an endpoint into a base URL with the version segment and a trailing slash
fn resource_base(endpoint: &str, version: Option<&str>) -> Result<Url> {
    let mut base = endpoint.trim_end_matches('/').to_string();
    if let Some(version) = version {
        if !base.ends_with(&format!("/{}", version)) {
            base.push('/');
            base.push_str(version);
        }
    }
    base.push('/');
    Url::parse(&base).map_err(|e| Error::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))
}

/// Authenticated control-plane session
#[derive(Clone)]
pub struct Session {
    http: OpenStackHttpClient,
    token: Arc<str>,
    auth_result: Option<Arc<AuthResult>>,
    scope: ScopeContext,
    identity: ServiceClient,
    compute: ServiceClient,
    image: ServiceClient,
    network: ServiceClient,
    block_storage: ServiceClient,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Security: the token never shows up in debug output
        f.debug_struct("Session")
            .field("scope", &self.scope)
            .field("identity", &self.identity.base.as_str())
            .field("compute", &self.compute.base.as_str())
            .field("image", &self.image.base.as_str())
            .field("network", &self.network.base.as_str())
            .field("block_storage", &self.block_storage.base.as_str())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Authenticate against the identity service and resolve every subsystem endpoint
    pub async fn connect(config: &AuthConfig) -> Result<Self> {
        let request = auth::token_request(config)?;
        let http = OpenStackHttpClient::new(config)?;

        let tokens_url = resource_base(&config.url, Some("v3"))?
            .join("auth/tokens")
            .map_err(|e| Error::Config(format!("invalid identity url {:?}: {}", config.url, e)))?;

        let (token, body) = http.issue_token(&tokens_url, &request).await?;
        let auth_result = AuthResult::from_response(body)?;

        let project = auth_result
            .project
            .as_ref()
            .map(|project| format!("project {} ({})", project.name, project.id))
            .unwrap_or_else(|| "no project".to_string());
        match auth_result.expires_at {
            Some(expires_at) => tracing::info!(
                "authenticated as {} ({}) in {}, token expires at {}",
                auth_result.user.name,
                auth_result.user.id,
                project,
                expires_at
            ),
            None => tracing::info!(
                "authenticated as {} ({}) in {}",
                auth_result.user.name,
                auth_result.user.id,
                project
            ),
        }

        let catalog = auth_result.catalog.clone();
        Self::assemble(config, http, token, &catalog, Some(auth_result))
    }

    /// Build a session around a token that was issued elsewhere.
    ///
    /// No handshake takes place, so the session has no auth result and
    /// cannot discover the caller's identity.
    pub fn from_token(config: &AuthConfig, token: &str, catalog: &Catalog) -> Result<Self> {
        let http = OpenStackHttpClient::new(config)?;
        Self::assemble(config, http, token.to_string(), catalog, None)
    }

    fn assemble(
        config: &AuthConfig,
        http: OpenStackHttpClient,
        token: String,
        catalog: &Catalog,
        auth_result: Option<AuthResult>,
    ) -> Result<Self> {
        let region = config.get(config::REGION_NAME);
        let interface = config.interface();

        let service = |subsystem: Subsystem| -> Result<ServiceClient> {
            let endpoint = catalog.endpoint_for(subsystem.service_types(), interface, region)?;
            tracing::debug!("{} endpoint: {}", subsystem, endpoint);
            ServiceClient::new(subsystem, &endpoint)
        };

        let scope = ScopeContext {
            project_name: config.get(config::PROJECT_NAME).to_string(),
            project_id: config.get(config::PROJECT_ID).to_string(),
            region_name: region.to_string(),
        };

        Ok(Self {
            identity: service(Subsystem::Identity)?,
            compute: service(Subsystem::Compute)?,
            image: service(Subsystem::Image)?,
            network: service(Subsystem::Network)?,
            block_storage: service(Subsystem::BlockStorage)?,
            http,
            token: token.into(),
            auth_result: auth_result.map(Arc::new),
            scope,
        })
    }

    /// Result of the authentication handshake, if there was one
    pub fn auth_result(&self) -> Option<&AuthResult> {
        self.auth_result.as_deref()
    }

    /// Configured region/project scope
    pub fn scope(&self) -> &ScopeContext {
        &self.scope
    }

    /// Endpoint handle of a subsystem
    pub fn service(&self, subsystem: Subsystem) -> &ServiceClient {
        match subsystem {
            Subsystem::Identity => &self.identity,
            Subsystem::Compute => &self.compute,
            Subsystem::Image => &self.image,
            Subsystem::Network => &self.network,
            Subsystem::BlockStorage => &self.block_storage,
        }
    }

    /// GET a JSON document with the session token
    pub(crate) async fn get_json(&self, url: &Url, request_id: &str) -> Result<Value> {
        self.http.get(url, &self.token, request_id).await
    }
}
