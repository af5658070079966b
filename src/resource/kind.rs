//! Resource kinds

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every kind of resource the inventory knows how to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Region,
    Project,
    Flavor,
    Image,
    Vm,
    Snapshot,
    Volume,
    VolumeType,
    Network,
    Subnet,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Region,
        ResourceKind::Project,
        ResourceKind::Flavor,
        ResourceKind::Image,
        ResourceKind::Vm,
        ResourceKind::Snapshot,
        ResourceKind::Volume,
        ResourceKind::VolumeType,
        ResourceKind::Network,
        ResourceKind::Subnet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Region => "region",
            ResourceKind::Project => "project",
            ResourceKind::Flavor => "flavor",
            ResourceKind::Image => "image",
            ResourceKind::Vm => "vm",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Volume => "volume",
            ResourceKind::VolumeType => "volumetype",
            ResourceKind::Network => "network",
            ResourceKind::Subnet => "subnet",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "region" => ResourceKind::Region,
            "project" => ResourceKind::Project,
            "flavor" => ResourceKind::Flavor,
            "image" => ResourceKind::Image,
            "vm" | "server" => ResourceKind::Vm,
            "snapshot" => ResourceKind::Snapshot,
            "volume" => ResourceKind::Volume,
            "volumetype" | "volume-type" => ResourceKind::VolumeType,
            "network" => ResourceKind::Network,
            "subnet" => ResourceKind::Subnet,
            _ => return Err(Error::ClassifiedAsUnsupported(s.to_string())),
        };
        Ok(kind)
    }
}
