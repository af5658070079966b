//! Error handling for the inventory adapter
//!
//! Every failure the adapter can surface is a variant of [`Error`]. HTTP
//! failures are classified by status so callers can tell an authorization
//! denial from a missing resource or a broken transport. Errors leaving the
//! dispatch facade are wrapped in [`Error::Call`], which records the
//! operation, kind and ID; [`Error::root`] peels that context off again.

use crate::resource::ResourceKind;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Facade operation recorded in error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => f.write_str("list"),
            Operation::Get => f.write_str("get"),
        }
    }
}

/// Possible errors when talking to the control-plane
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials were missing, incomplete or rejected by the identity service
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The configured `authType` is not one we know how to build
    #[error("unsupported authentication type: {0:?}")]
    UnsupportedAuthType(String),

    /// Neither the supplied CA bundle nor the system trust store could be used
    #[error("failed to configure TLS trust: {0}")]
    TrustConfiguration(String),

    /// The token catalog has no endpoint for a subsystem in the configured region
    #[error("no {interface} endpoint for service type {service_type:?} in region {region:?}")]
    EndpointNotFound {
        service_type: String,
        interface: String,
        region: String,
    },

    /// Network or TLS failure while the request was in flight
    #[error("transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The control-plane answered 403
    #[error("forbidden: {resource}: {message}")]
    Forbidden { resource: String, message: String },

    /// The control-plane answered 404, or the resource is outside the caller's scope
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-success status
    #[error("request to {url} failed with status {status}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Scope fallback needs the caller's user ID but the session has no auth result
    #[error("no auth result available: the session was not built through a token request")]
    NoAuthResult,

    /// Unknown resource kind, or a filter that does not belong to the requested kind
    #[error("unsupported resource kind: {0}")]
    ClassifiedAsUnsupported(String),

    /// Configuration file could not be read or parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Context added by the dispatch facade
    #[error("{operation} {kind}{}: {source}", display_id(.id))]
    Call {
        operation: Operation,
        kind: ResourceKind,
        id: Option<String>,
        #[source]
        source: Box<Error>,
    },
}

fn display_id(id: &Option<String>) -> String {
    id.as_deref().map(|id| format!(" {id}")).unwrap_or_default()
}

impl Error {
    /// Wrap this error with facade context
    pub(crate) fn in_call(self, operation: Operation, kind: ResourceKind, id: Option<&str>) -> Self {
        Error::Call {
            operation,
            kind,
            id: id.map(str::to_string),
            source: Box::new(self),
        }
    }

    /// The classified error underneath any facade context
    pub fn root(&self) -> &Error {
        match self {
            Error::Call { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self.root(), Error::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Error::Transport { .. })
    }

    /// Whether a caller may reasonably retry or report and move on.
    ///
    /// Configuration problems (credentials, auth type, trust store, missing
    /// endpoints, missing auth result) are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Error::Transport { .. } | Error::Forbidden { .. } | Error::NotFound { .. } => true,
            Error::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
