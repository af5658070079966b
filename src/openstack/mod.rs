//! OpenStack API interaction module
//!
//! Authentication, the HTTP transport and the per-subsystem endpoint handles
//! that the resource layer builds its queries on.
//!
//! # Module Structure
//!
//! - [`auth`] - identity v3 token requests and the service catalog
//! - [`http`] - HTTP transport, TLS trust and status classification
//! - [`session`] - the authenticated [`Session`] and its subsystem handles
//!
//! # Example
//!
//! ```ignore
//! use openstack_inventory::{AuthConfig, ListFilter, ResourceKind, Session};
//!
//! async fn example(config: &AuthConfig) -> openstack_inventory::Result<()> {
//!     let session = Session::connect(config).await?;
//!     let flavors = session.list(ResourceKind::Flavor, &ListFilter::All).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod http;
pub mod session;

pub use auth::{AuthResult, Catalog};
pub use session::{ServiceClient, Session, Subsystem};
