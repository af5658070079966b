//! Read-only OpenStack inventory adapter
//!
//! Connects to an OpenStack control-plane with identity v3 credentials and
//! lists or gets ten kinds of resources (regions, projects, flavors, images,
//! servers, snapshots, volumes, volume types, networks, subnets) as one
//! uniform, kind-tagged model.

pub mod config;
pub mod error;
pub mod openstack;
pub mod progress;
pub mod resource;

pub use config::AuthConfig;
pub use error::{Error, Result};
pub use openstack::Session;
pub use resource::{ListFilter, NormalizedResource, ResourceKind};
