//! Resource Registry - one behavior row per resource kind
//!
//! Each [`ResourceDef`] says which subsystem serves a kind, where to list and
//! get it, how the subsystem links its pages, and whether items need a
//! second call to be complete. The table is selected with an exhaustive
//! `match`, so adding a kind without a row does not compile.

use super::kind::ResourceKind;
use crate::openstack::Subsystem;

/// How a subsystem points at the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Identity style: `{"links": {"next": "<url>"|null}}`
    Links,
    /// Compute/network/block-storage style: `{"<key>": [{"rel": "next", "href": "<url>"}]}`
    CollectionLinks(&'static str),
    /// Image style: `{"next": "/v2/images?marker=..."}`
    NextField,
}

/// Secondary per-item call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    None,
    /// GET `<get path>/<id>/<suffix>` returning `{"extra_specs": {..}}`
    ExtraSpecs(&'static str),
}

/// Restriction to the session's configured scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    None,
    Region,
    Project,
}

/// Resource definition
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub subsystem: Subsystem,
    pub list_path: &'static str,
    /// Collection path an ID is appended to
    pub get_path: &'static str,
    /// Member of a list response holding the items
    pub collection_key: &'static str,
    /// Member of a get response holding the item; `None` when unwrapped
    pub item_key: Option<&'static str>,
    pub pagination: Pagination,
    pub enrichment: Enrichment,
    pub scope: ScopeFilter,
}

impl ResourceDef {
    /// Relative path of a single item
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.get_path, urlencoding::encode(id))
    }

    /// Relative path of an item's enrichment call, if the kind has one
    pub fn enrichment_path(&self, id: &str) -> Option<String> {
        match self.enrichment {
            Enrichment::None => None,
            Enrichment::ExtraSpecs(suffix) => Some(format!("{}/{}", self.item_path(id), suffix)),
        }
    }
}

static REGION: ResourceDef = ResourceDef {
    kind: ResourceKind::Region,
    subsystem: Subsystem::Identity,
    list_path: "regions",
    get_path: "regions",
    collection_key: "regions",
    item_key: Some("region"),
    pagination: Pagination::Links,
    enrichment: Enrichment::None,
    scope: ScopeFilter::Region,
};

static PROJECT: ResourceDef = ResourceDef {
    kind: ResourceKind::Project,
    subsystem: Subsystem::Identity,
    list_path: "projects",
    get_path: "projects",
    collection_key: "projects",
    item_key: Some("project"),
    pagination: Pagination::Links,
    enrichment: Enrichment::None,
    scope: ScopeFilter::Project,
};

static FLAVOR: ResourceDef = ResourceDef {
    kind: ResourceKind::Flavor,
    subsystem: Subsystem::Compute,
    list_path: "flavors/detail",
    get_path: "flavors",
    collection_key: "flavors",
    item_key: Some("flavor"),
    pagination: Pagination::CollectionLinks("flavors_links"),
    enrichment: Enrichment::ExtraSpecs("os-extra_specs"),
    scope: ScopeFilter::None,
};

static IMAGE: ResourceDef = ResourceDef {
    kind: ResourceKind::Image,
    subsystem: Subsystem::Image,
    list_path: "images",
    get_path: "images",
    collection_key: "images",
    item_key: None,
    pagination: Pagination::NextField,
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static VM: ResourceDef = ResourceDef {
    kind: ResourceKind::Vm,
    subsystem: Subsystem::Compute,
    list_path: "servers/detail",
    get_path: "servers",
    collection_key: "servers",
    item_key: Some("server"),
    pagination: Pagination::CollectionLinks("servers_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static SNAPSHOT: ResourceDef = ResourceDef {
    kind: ResourceKind::Snapshot,
    subsystem: Subsystem::BlockStorage,
    list_path: "snapshots/detail",
    get_path: "snapshots",
    collection_key: "snapshots",
    item_key: Some("snapshot"),
    pagination: Pagination::CollectionLinks("snapshots_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static VOLUME: ResourceDef = ResourceDef {
    kind: ResourceKind::Volume,
    subsystem: Subsystem::BlockStorage,
    list_path: "volumes/detail",
    get_path: "volumes",
    collection_key: "volumes",
    item_key: Some("volume"),
    pagination: Pagination::CollectionLinks("volumes_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static VOLUME_TYPE: ResourceDef = ResourceDef {
    kind: ResourceKind::VolumeType,
    subsystem: Subsystem::BlockStorage,
    list_path: "types",
    get_path: "types",
    collection_key: "volume_types",
    item_key: Some("volume_type"),
    pagination: Pagination::CollectionLinks("volume_types_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static NETWORK: ResourceDef = ResourceDef {
    kind: ResourceKind::Network,
    subsystem: Subsystem::Network,
    list_path: "networks",
    get_path: "networks",
    collection_key: "networks",
    item_key: Some("network"),
    pagination: Pagination::CollectionLinks("networks_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

static SUBNET: ResourceDef = ResourceDef {
    kind: ResourceKind::Subnet,
    subsystem: Subsystem::Network,
    list_path: "subnets",
    get_path: "subnets",
    collection_key: "subnets",
    item_key: Some("subnet"),
    pagination: Pagination::CollectionLinks("subnets_links"),
    enrichment: Enrichment::None,
    scope: ScopeFilter::None,
};

/// Projects of one user, listed like [`ResourceKind::Project`] by the scope fallback
pub fn user_projects_path(user_id: &str) -> String {
    format!("users/{}/projects", urlencoding::encode(user_id))
}

/// Get the resource definition of a kind
pub fn get_resource(kind: ResourceKind) -> &'static ResourceDef {
    match kind {
        ResourceKind::Region => &REGION,
        ResourceKind::Project => &PROJECT,
        ResourceKind::Flavor => &FLAVOR,
        ResourceKind::Image => &IMAGE,
        ResourceKind::Vm => &VM,
        ResourceKind::Snapshot => &SNAPSHOT,
        ResourceKind::Volume => &VOLUME,
        ResourceKind::VolumeType => &VOLUME_TYPE,
        ResourceKind::Network => &NETWORK,
        ResourceKind::Subnet => &SUBNET,
    }
}

/// Get all resource keys (for the `kinds` command)
pub fn get_all_resource_keys() -> Vec<&'static str> {
    ResourceKind::ALL.iter().map(|kind| kind.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_its_own_row() {
        for kind in ResourceKind::ALL {
            assert_eq!(get_resource(kind).kind, kind);
        }
    }

    #[test]
    fn test_subsystem_assignment() {
        assert_eq!(get_resource(ResourceKind::Region).subsystem, Subsystem::Identity);
        assert_eq!(get_resource(ResourceKind::Project).subsystem, Subsystem::Identity);
        assert_eq!(get_resource(ResourceKind::Flavor).subsystem, Subsystem::Compute);
        assert_eq!(get_resource(ResourceKind::Vm).subsystem, Subsystem::Compute);
        assert_eq!(get_resource(ResourceKind::Image).subsystem, Subsystem::Image);
        assert_eq!(get_resource(ResourceKind::Snapshot).subsystem, Subsystem::BlockStorage);
        assert_eq!(get_resource(ResourceKind::Volume).subsystem, Subsystem::BlockStorage);
        assert_eq!(get_resource(ResourceKind::VolumeType).subsystem, Subsystem::BlockStorage);
        assert_eq!(get_resource(ResourceKind::Network).subsystem, Subsystem::Network);
        assert_eq!(get_resource(ResourceKind::Subnet).subsystem, Subsystem::Network);
    }

    #[test]
    fn test_only_flavor_is_enriched() {
        for kind in ResourceKind::ALL {
            let enriched = get_resource(kind).enrichment != Enrichment::None;
            assert_eq!(enriched, kind == ResourceKind::Flavor, "{}", kind);
        }
        assert_eq!(
            get_resource(ResourceKind::Flavor).enrichment_path("f1").as_deref(),
            Some("flavors/f1/os-extra_specs")
        );
    }

    #[test]
    fn test_only_identity_kinds_are_scoped() {
        assert_eq!(get_resource(ResourceKind::Region).scope, ScopeFilter::Region);
        assert_eq!(get_resource(ResourceKind::Project).scope, ScopeFilter::Project);
        for kind in ResourceKind::ALL {
            if kind != ResourceKind::Region && kind != ResourceKind::Project {
                assert_eq!(get_resource(kind).scope, ScopeFilter::None);
            }
        }
    }

    #[test]
    fn test_item_path_escapes_ids() {
        assert_eq!(get_resource(ResourceKind::Vm).item_path("a b/c"), "servers/a%20b%2Fc");
    }

    #[test]
    fn test_get_all_resource_keys() {
        let keys = get_all_resource_keys();
        assert_eq!(keys.len(), 10);
        assert!(keys.contains(&"volumetype"));
    }
}
