//! Normalized resource model
//!
//! One typed record per kind. The fields every consumer needs are typed;
//! everything else the subsystem returned is kept verbatim in `attributes`
//! so no native data is lost on the way through.

use super::kind::ResourceKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub parent_region_id: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub vcpus: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(rename = "os-flavor-access:is_public", default = "default_true")]
    pub is_public: bool,
    /// Filled from the per-flavor extra specs call
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra_specs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub disk_format: Option<String>,
    #[serde(default)]
    pub container_format: Option<String>,
    #[serde(default)]
    pub min_disk: u64,
    #[serde(default)]
    pub min_ram: u64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vm {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tenant_id: String,
    #[serde(rename = "OS-EXT-AZ:availability_zone", default)]
    pub availability_zone: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeType {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "os-volume-type-access:is_public", default = "default_true")]
    pub is_public: bool,
    /// Never absent: a missing or null map becomes an empty one
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra_specs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub admin_state_up: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subnets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cidr: String,
    #[serde(default)]
    pub ip_version: u8,
    #[serde(default)]
    pub gateway_ip: Option<String>,
    #[serde(default)]
    pub enable_dhcp: bool,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A fetched resource, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "resource", rename_all = "lowercase")]
pub enum NormalizedResource {
    Region(Region),
    Project(Project),
    Flavor(Flavor),
    Image(Image),
    Vm(Vm),
    Snapshot(Snapshot),
    Volume(Volume),
    VolumeType(VolumeType),
    Network(Network),
    Subnet(Subnet),
}

impl NormalizedResource {
    /// Decode a raw item of the given kind. `source` names where it came from.
    pub fn from_raw(kind: ResourceKind, raw: Value, source: &str) -> Result<Self> {
        fn decode<T: serde::de::DeserializeOwned>(raw: Value, source: &str) -> Result<T> {
            serde_json::from_value(raw).map_err(|e| Error::Decode {
                url: source.to_string(),
                source: e,
            })
        }

        let resource = match kind {
            ResourceKind::Region => NormalizedResource::Region(decode(raw, source)?),
            ResourceKind::Project => NormalizedResource::Project(decode(raw, source)?),
            ResourceKind::Flavor => NormalizedResource::Flavor(decode(raw, source)?),
            ResourceKind::Image => NormalizedResource::Image(decode(raw, source)?),
            ResourceKind::Vm => NormalizedResource::Vm(decode(raw, source)?),
            ResourceKind::Snapshot => NormalizedResource::Snapshot(decode(raw, source)?),
            ResourceKind::Volume => NormalizedResource::Volume(decode(raw, source)?),
            ResourceKind::VolumeType => NormalizedResource::VolumeType(decode(raw, source)?),
            ResourceKind::Network => NormalizedResource::Network(decode(raw, source)?),
            ResourceKind::Subnet => NormalizedResource::Subnet(decode(raw, source)?),
        };
        Ok(resource)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            NormalizedResource::Region(_) => ResourceKind::Region,
            NormalizedResource::Project(_) => ResourceKind::Project,
            NormalizedResource::Flavor(_) => ResourceKind::Flavor,
            NormalizedResource::Image(_) => ResourceKind::Image,
            NormalizedResource::Vm(_) => ResourceKind::Vm,
            NormalizedResource::Snapshot(_) => ResourceKind::Snapshot,
            NormalizedResource::Volume(_) => ResourceKind::Volume,
            NormalizedResource::VolumeType(_) => ResourceKind::VolumeType,
            NormalizedResource::Network(_) => ResourceKind::Network,
            NormalizedResource::Subnet(_) => ResourceKind::Subnet,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NormalizedResource::Region(r) => &r.id,
            NormalizedResource::Project(r) => &r.id,
            NormalizedResource::Flavor(r) => &r.id,
            NormalizedResource::Image(r) => &r.id,
            NormalizedResource::Vm(r) => &r.id,
            NormalizedResource::Snapshot(r) => &r.id,
            NormalizedResource::Volume(r) => &r.id,
            NormalizedResource::VolumeType(r) => &r.id,
            NormalizedResource::Network(r) => &r.id,
            NormalizedResource::Subnet(r) => &r.id,
        }
    }

    /// Display name. Regions have none, so their ID is used.
    pub fn name(&self) -> &str {
        match self {
            NormalizedResource::Region(r) => &r.id,
            NormalizedResource::Project(r) => &r.name,
            NormalizedResource::Flavor(r) => &r.name,
            NormalizedResource::Image(r) => &r.name,
            NormalizedResource::Vm(r) => &r.name,
            NormalizedResource::Snapshot(r) => &r.name,
            NormalizedResource::Volume(r) => &r.name,
            NormalizedResource::VolumeType(r) => &r.name,
            NormalizedResource::Network(r) => &r.name,
            NormalizedResource::Subnet(r) => &r.name,
        }
    }

    /// Enrichment attributes, for the kinds that carry them
    pub fn extra_specs(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            NormalizedResource::Flavor(f) => Some(&f.extra_specs),
            NormalizedResource::VolumeType(t) => Some(&t.extra_specs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_volume_type_without_extra_specs_gets_empty_map() {
        for raw in [
            json!({"id": "vt-1", "name": "ceph"}),
            json!({"id": "vt-1", "name": "ceph", "extra_specs": null}),
        ] {
            let resource = NormalizedResource::from_raw(ResourceKind::VolumeType, raw, "test").unwrap();
            assert_eq!(resource.extra_specs(), Some(&BTreeMap::new()));
        }
    }

    #[test]
    fn test_volume_type_keeps_extra_specs() {
        let raw = json!({
            "id": "vt-1",
            "name": "ceph",
            "os-volume-type-access:is_public": false,
            "extra_specs": {"volume_backend_name": "ceph"}
        });
        match NormalizedResource::from_raw(ResourceKind::VolumeType, raw, "test").unwrap() {
            NormalizedResource::VolumeType(vt) => {
                assert!(!vt.is_public);
                assert_eq!(vt.extra_specs["volume_backend_name"], "ceph");
                assert!(vt.attributes.is_empty());
            },
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let raw = json!({
            "id": "vm-1",
            "name": "web",
            "status": "ACTIVE",
            "tenant_id": "p-1",
            "flavor": {"id": "f1"},
            "OS-EXT-STS:vm_state": "active"
        });
        let resource = NormalizedResource::from_raw(ResourceKind::Vm, raw, "test").unwrap();
        assert_eq!(resource.kind(), ResourceKind::Vm);
        assert_eq!(resource.name(), "web");
        match resource {
            NormalizedResource::Vm(vm) => {
                assert_eq!(vm.attributes["flavor"]["id"], "f1");
                assert_eq!(vm.attributes["OS-EXT-STS:vm_state"], "active");
            },
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_null_names_become_empty() {
        let raw = json!({"id": "vol-1", "name": null, "status": "available", "size": 10});
        let resource = NormalizedResource::from_raw(ResourceKind::Volume, raw, "test").unwrap();
        assert_eq!(resource.name(), "");
        assert_eq!(resource.id(), "vol-1");
    }

    #[test]
    fn test_missing_id_is_decode_error() {
        let err = NormalizedResource::from_raw(ResourceKind::Network, json!({"name": "x"}), "http://neutron")
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_serializes_kind_tag() {
        let raw = json!({"id": "RegionOne", "description": ""});
        let resource = NormalizedResource::from_raw(ResourceKind::Region, raw, "test").unwrap();
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["kind"], "region");
        assert_eq!(value["resource"]["id"], "RegionOne");
    }
}
