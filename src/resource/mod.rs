//! Resource abstraction layer
//!
//! Every kind the inventory knows is described by one row of a static table,
//! so listing, paging and enrichment are driven by data rather than by a
//! hand-written function per kind.
//!
//! # Architecture
//!
//! - [`registry`] - One [`ResourceDef`] per [`ResourceKind`]: subsystem, paths, paging style, enrichment
//! - [`fetcher`] - Walks pages to exhaustion and runs per-item enrichment
//! - [`scope`] - Region/Project scope narrowing and the forbidden-Project fallback
//! - `dispatch` - The public [`Session::list`](crate::Session::list) / [`Session::get`](crate::Session::get)
//!
//! # Example
//!
//! ```ignore
//! use openstack_inventory::{AuthConfig, ListFilter, ResourceKind, Session};
//!
//! async fn list_flavors(config: &AuthConfig) -> openstack_inventory::Result<()> {
//!     let session = Session::connect(config).await?;
//!     for flavor in session.list(ResourceKind::Flavor, &ListFilter::All).await? {
//!         println!("{} {:?}", flavor.name(), flavor.extra_specs());
//!     }
//!     Ok(())
//! }
//! ```

mod dispatch;
pub mod fetcher;
mod filter;
mod kind;
mod model;
pub mod registry;
pub mod scope;

pub use filter::{
    FlavorListOpts, ImageListOpts, ListFilter, NetworkListOpts, ProjectListOpts, Query, RegionListOpts,
    SubnetListOpts, VmListOpts, VolumeListOpts, VolumeTypeListOpts,
};
pub use kind::ResourceKind;
pub use model::{
    Flavor, Image, Network, NormalizedResource, Project, Region, Snapshot, Subnet, Vm, Volume, VolumeType,
};
pub use registry::{get_all_resource_keys, get_resource, ResourceDef};
pub use scope::ScopeContext;
