//! HTTP utilities for OpenStack REST API calls

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use reqwest::{Certificate, Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Dial timeout, which also bounds the TLS handshake
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const TCP_KEEPALIVE: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_MAX_IDLE_PER_HOST: usize = 10;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const REQUEST_ID_HEADER: &str = "X-OpenStack-Request-ID";

/// Sanitize response body for logging
/// Truncates long responses and drops non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull the human readable message out of an OpenStack fault body.
///
/// Services wrap faults differently (`{"itemNotFound": {"message": ..}}`,
/// `{"error": {"message": ..}}`, `{"NeutronError": {"message": ..}}`), so the
/// first object member carrying a `message` wins.
fn fault_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value.as_object().and_then(|map| {
            map.values()
                .find_map(|fault| fault.get("message").and_then(Value::as_str))
                .or_else(|| map.get("message").and_then(Value::as_str))
                .map(str::to_string)
        })
    });
    sanitize_for_log(&message.unwrap_or_else(|| body.to_string()))
}

/// Parse a PEM bundle into trust roots. `None` when absent or malformed.
pub(crate) fn parse_ca_bundle(pem: &str) -> Option<Vec<Certificate>> {
    let ders = rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()?;
    if ders.is_empty() {
        return None;
    }
    ders.iter()
        .map(|der| Certificate::from_der(der.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()
}

/// HTTP client wrapper for OpenStack API calls
#[derive(Clone)]
pub struct OpenStackHttpClient {
    client: Client,
}

impl OpenStackHttpClient {
    /// Create a new HTTP client with the trust and timeouts described by `config`
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.insecure_skip_verify() {
            tracing::warn!("TLS certificate verification is disabled");
            let client = Self::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|e| Error::TrustConfiguration(e.to_string()))?;
            return Ok(Self { client });
        }

        match parse_ca_bundle(config.get(crate::config::CA_CERT)) {
            Some(roots) => {
                let mut builder = Self::builder().tls_built_in_root_certs(false);
                for root in roots {
                    builder = builder.add_root_certificate(root);
                }
                // PEM framing alone does not make a trust anchor; rustls rejects bad DER here
                match builder.build() {
                    Ok(client) => return Ok(Self { client }),
                    Err(e) => tracing::info!(
                        "the CA certificate could not be loaded ({}), falling back to system CA cert pool",
                        e
                    ),
                }
            },
            None => tracing::info!(
                "the CA certificate is malformed or was not provided, falling back to system CA cert pool"
            ),
        }

        let client = Self::builder()
            .tls_built_in_root_certs(true)
            .build()
            .map_err(|e| Error::TrustConfiguration(format!("failed to configure the system's cert pool: {}", e)))?;
        Ok(Self { client })
    }

    /// Transport settings shared by every trust mode
    fn builder() -> ClientBuilder {
        Client::builder()
            .user_agent(concat!("osinv/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
    }

    /// Make a GET request to an OpenStack API
    pub async fn get(&self, url: &Url, token: &str, request_id: &str) -> Result<Value> {
        tracing::debug!("GET {} ({})", url, request_id);

        let response = self
            .client
            .get(url.clone())
            .header(AUTH_TOKEN_HEADER, token)
            .header(REQUEST_ID_HEADER, request_id)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let body = Self::checked_body(url, response).await?;

        serde_json::from_str(&body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// POST a token request to the identity service.
    /// Returns the issued token and the decoded body.
    pub async fn issue_token(&self, url: &Url, body: &Value) -> Result<(String, Value)> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("token request rejected: {} - {}", status, sanitize_for_log(&text));
            return Err(Error::Auth(format!(
                "identity service answered {}: {}",
                status,
                fault_message(&text)
            )));
        }

        let token = token.ok_or_else(|| {
            Error::Auth(format!("identity service response is missing {}", SUBJECT_TOKEN_HEADER))
        })?;
        let body = serde_json::from_str(&text).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })?;

        Ok((token, body))
    }

    /// Read the body, classifying non-success statuses
    async fn checked_body(url: &Url, response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        if status.is_success() {
            return Ok(body);
        }

        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        Err(classify(status, url, &body))
    }
}

/// Map a failed status onto the error taxonomy
fn classify(status: StatusCode, url: &Url, body: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound {
            resource: url.to_string(),
        },
        StatusCode::FORBIDDEN => Error::Forbidden {
            resource: url.to_string(),
            message: fault_message(body),
        },
        other => Error::Status {
            status: other.as_u16(),
            url: url.to_string(),
            message: fault_message(body),
        },
    }
}
