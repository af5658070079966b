//! List filters
//!
//! Each kind has its own options struct mirroring the query parameters its
//! subsystem understands. Unset options are left out of the query.

use super::kind::ResourceKind;
use crate::error::{Error, Result};

/// Query parameters in the order they were set
pub type Query = Vec<(&'static str, String)>;

fn push<T: ToString>(query: &mut Query, key: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

fn push_str(query: &mut Query, key: &'static str, value: &str) {
    if !value.is_empty() {
        query.push((key, value.to_string()));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionListOpts {
    pub parent_region_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectListOpts {
    /// Always replaced by the session's configured project name
    pub name: String,
    pub domain_id: String,
    pub parent_id: String,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlavorListOpts {
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    pub is_public: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageListOpts {
    pub name: String,
    pub status: String,
    pub visibility: String,
    pub owner: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmListOpts {
    pub name: String,
    pub status: String,
    pub flavor: String,
    pub image: String,
    pub all_tenants: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeListOpts {
    pub name: String,
    pub status: String,
    pub all_tenants: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeTypeListOpts {
    pub is_public: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkListOpts {
    pub name: String,
    pub status: String,
    pub project_id: String,
    pub shared: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubnetListOpts {
    pub name: String,
    pub network_id: String,
    pub cidr: String,
    pub ip_version: Option<u8>,
    pub limit: Option<u32>,
}

/// Kind-specific filter for [`Session::list`](crate::Session::list)
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListFilter {
    /// No constraints; valid for every kind
    #[default]
    All,
    Region(RegionListOpts),
    Project(ProjectListOpts),
    Flavor(FlavorListOpts),
    Image(ImageListOpts),
    Vm(VmListOpts),
    Volume(VolumeListOpts),
    VolumeType(VolumeTypeListOpts),
    Network(NetworkListOpts),
    Subnet(SubnetListOpts),
}

impl ListFilter {
    /// Kind this filter belongs to, `None` for [`ListFilter::All`]
    pub fn kind(&self) -> Option<ResourceKind> {
        let kind = match self {
            ListFilter::All => return None,
            ListFilter::Region(_) => ResourceKind::Region,
            ListFilter::Project(_) => ResourceKind::Project,
            ListFilter::Flavor(_) => ResourceKind::Flavor,
            ListFilter::Image(_) => ResourceKind::Image,
            ListFilter::Vm(_) => ResourceKind::Vm,
            ListFilter::Volume(_) => ResourceKind::Volume,
            ListFilter::VolumeType(_) => ResourceKind::VolumeType,
            ListFilter::Network(_) => ResourceKind::Network,
            ListFilter::Subnet(_) => ResourceKind::Subnet,
        };
        Some(kind)
    }

    /// Render the query for `kind`, rejecting filters meant for another kind
    pub fn query_for(&self, kind: ResourceKind) -> Result<Query> {
        if let Some(own) = self.kind() {
            if own != kind {
                return Err(Error::ClassifiedAsUnsupported(format!(
                    "{} filter cannot be applied to {}",
                    own, kind
                )));
            }
        }
        Ok(self.query())
    }

    fn query(&self) -> Query {
        let mut q = Query::new();
        match self {
            ListFilter::All => {},
            ListFilter::Region(o) => push_str(&mut q, "parent_region_id", &o.parent_region_id),
            ListFilter::Project(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "domain_id", &o.domain_id);
                push_str(&mut q, "parent_id", &o.parent_id);
                push(&mut q, "enabled", &o.enabled);
            },
            ListFilter::Flavor(o) => {
                push(&mut q, "minDisk", &o.min_disk);
                push(&mut q, "minRam", &o.min_ram);
                push(&mut q, "is_public", &o.is_public);
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::Image(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "status", &o.status);
                push_str(&mut q, "visibility", &o.visibility);
                push_str(&mut q, "owner", &o.owner);
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::Vm(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "status", &o.status);
                push_str(&mut q, "flavor", &o.flavor);
                push_str(&mut q, "image", &o.image);
                if o.all_tenants {
                    q.push(("all_tenants", "True".to_string()));
                }
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::Volume(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "status", &o.status);
                if o.all_tenants {
                    q.push(("all_tenants", "true".to_string()));
                }
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::VolumeType(o) => {
                push(&mut q, "is_public", &o.is_public);
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::Network(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "status", &o.status);
                push_str(&mut q, "project_id", &o.project_id);
                push(&mut q, "shared", &o.shared);
                push(&mut q, "limit", &o.limit);
            },
            ListFilter::Subnet(o) => {
                push_str(&mut q, "name", &o.name);
                push_str(&mut q, "network_id", &o.network_id);
                push_str(&mut q, "cidr", &o.cidr);
                push(&mut q, "ip_version", &o.ip_version);
                push(&mut q, "limit", &o.limit);
            },
        }
        q
    }
}
