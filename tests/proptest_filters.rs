//! Property-based tests using proptest
//!
//! These tests check scope narrowing, list filter rendering, kind parsing
//! and resource normalization against randomized inputs.

use openstack_inventory::resource::{
    ImageListOpts, NetworkListOpts, Project, Region, ScopeContext, SubnetListOpts, VmListOpts,
};
use openstack_inventory::{ListFilter, NormalizedResource, ResourceKind};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate a region list that may or may not contain the configured one
fn arb_regions() -> impl Strategy<Value = Vec<Region>> {
    prop::collection::vec(
        prop_oneof!["RegionOne", "RegionTwo", "regionone", "RegionOne-a", ""],
        0..20,
    )
    .prop_map(|ids| {
        ids.into_iter()
            .map(|id| serde_json::from_value(json!({"id": id})).unwrap())
            .collect()
    })
}

/// Generate projects with unique IDs and possibly repeated names
fn arb_projects() -> impl Strategy<Value = Vec<Project>> {
    prop::collection::vec(prop_oneof!["acme", "Acme", "sandbox", "ops", ""], 0..30).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| serde_json::from_value(json!({"id": format!("p-{}", i), "name": name})).unwrap())
            .collect()
    })
}

fn arb_kind() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

fn scope(region: &str, project: &str) -> ScopeContext {
    ScopeContext {
        project_name: project.to_string(),
        project_id: String::new(),
        region_name: region.to_string(),
    }
}

proptest! {
    /// Region narrowing returns zero or one entries, and only the configured one
    #[test]
    fn region_scope_keeps_at_most_the_configured_region(regions in arb_regions()) {
        let scope = scope("RegionOne", "acme");
        // Region IDs are unique in a real catalog
        let mut seen = std::collections::HashSet::new();
        let regions: Vec<_> = regions.into_iter().filter(|r| seen.insert(r.id.clone())).collect();

        let kept: Vec<_> = regions.iter().filter(|r| scope.admits_region(r)).collect();

        prop_assert!(kept.len() <= 1);
        prop_assert!(kept.iter().all(|r| r.id == "RegionOne"));
        prop_assert_eq!(kept.len(), regions.iter().filter(|r| r.id == "RegionOne").count());
    }

    /// Project narrowing is an exact, case-sensitive name match
    #[test]
    fn project_scope_matches_name_exactly(projects in arb_projects()) {
        let scope = scope("RegionOne", "acme");
        for project in &projects {
            prop_assert_eq!(scope.admits_project(project), project.name == "acme");
        }
    }

    /// Unscoped kinds pass narrowing untouched
    #[test]
    fn unscoped_kinds_are_always_admitted(id in "[a-z0-9-]{1,36}", name in "[a-zA-Z0-9 ._-]{0,40}") {
        let scope = scope("RegionOne", "acme");
        let raw = json!({"id": id, "name": name});
        let network = NormalizedResource::from_raw(ResourceKind::Network, raw.clone(), "test").unwrap();
        let volume = NormalizedResource::from_raw(ResourceKind::Volume, raw, "test").unwrap();
        prop_assert!(scope.admits(&network));
        prop_assert!(scope.admits(&volume));
    }

    /// Unset options never show up in the query, set ones keep their value
    #[test]
    fn subnet_query_contains_only_set_options(
        name in "[a-z0-9-]{0,12}",
        network_id in "[a-f0-9-]{0,36}",
        ip_version in prop::option::of(prop_oneof![Just(4u8), Just(6u8)]),
    ) {
        let filter = ListFilter::Subnet(SubnetListOpts {
            name: name.clone(),
            network_id: network_id.clone(),
            ip_version,
            ..Default::default()
        });
        let query = filter.query_for(ResourceKind::Subnet).unwrap();

        prop_assert!(query.iter().all(|(_, value)| !value.is_empty()));
        prop_assert_eq!(query.iter().any(|(k, _)| *k == "name"), !name.is_empty());
        prop_assert_eq!(query.iter().any(|(k, _)| *k == "network_id"), !network_id.is_empty());
        prop_assert_eq!(
            query.iter().find(|(k, _)| *k == "ip_version").map(|(_, v)| v.clone()),
            ip_version.map(|v| v.to_string())
        );
    }

    /// A filter only applies to its own kind; the empty filter applies to all
    #[test]
    fn filters_apply_to_their_own_kind_only(kind in arb_kind()) {
        let filters = [
            ListFilter::Vm(VmListOpts::default()),
            ListFilter::Image(ImageListOpts::default()),
            ListFilter::Network(NetworkListOpts::default()),
            ListFilter::Subnet(SubnetListOpts::default()),
        ];
        for filter in &filters {
            let own = filter.kind().unwrap();
            prop_assert_eq!(filter.query_for(kind).is_ok(), own == kind);
        }
        prop_assert!(ListFilter::All.query_for(kind).unwrap().is_empty());
    }

    /// Kind names parse back regardless of case
    #[test]
    fn kind_names_parse_case_insensitively(kind in arb_kind(), upper in any::<bool>()) {
        let text = if upper { kind.as_str().to_uppercase() } else { kind.as_str().to_string() };
        prop_assert_eq!(text.parse::<ResourceKind>().unwrap(), kind);
    }

    /// Anything that is not a kind name is rejected
    #[test]
    fn unknown_kind_names_are_rejected(text in "[a-z]{1,12}") {
        let known = ResourceKind::ALL.iter().any(|k| k.as_str() == text)
            || text == "server";
        prop_assume!(!known);
        prop_assert!(text.parse::<ResourceKind>().is_err());
    }

    /// Volume types always normalize with an attribute map
    #[test]
    fn volume_types_never_lack_extra_specs(
        id in "[a-f0-9-]{1,36}",
        specs in prop::option::of(prop::collection::btree_map("[a-z_:]{1,20}", "[a-z0-9]{0,10}", 0..5)),
        explicit_null in any::<bool>(),
    ) {
        let mut raw = json!({"id": id, "name": "type"});
        match (&specs, explicit_null) {
            (Some(specs), _) => raw["extra_specs"] = json!(specs),
            (None, true) => raw["extra_specs"] = Value::Null,
            (None, false) => {},
        }

        let resource = NormalizedResource::from_raw(ResourceKind::VolumeType, raw, "test").unwrap();

        let got = resource.extra_specs().unwrap();
        prop_assert_eq!(got, &specs.unwrap_or_default());
    }

    /// Unknown fields survive normalization
    #[test]
    fn unknown_fields_are_kept(kind in arb_kind(), key in "x-[a-z]{1,10}", value in "[a-zA-Z0-9]{0,20}") {
        let mut raw = json!({"id": "id-1", "name": "n"});
        raw[key.as_str()] = json!(value);

        let resource = NormalizedResource::from_raw(kind, raw, "test").unwrap();
        let serialized = serde_json::to_value(&resource).unwrap();

        prop_assert_eq!(&serialized["resource"][key.as_str()], &json!(value));
        prop_assert_eq!(&serialized["kind"], &json!(kind.as_str()));
    }
}
