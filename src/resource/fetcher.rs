//! Resource Fetcher
//!
//! Walks every page of a listing, extracts typed items from each page and
//! runs the per-item enrichment call where the kind needs one. Nothing is
//! returned until the whole walk succeeded.

use super::filter::Query;
use super::model::NormalizedResource;
use super::registry::{Enrichment, Pagination, ResourceDef};
use crate::error::{Error, Result};
use crate::openstack::Session;
use serde::de::Error as _;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Result of one page fetch
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub next: Option<Url>,
}

/// Fetch all raw items of a listing (auto-paginate)
pub async fn fetch_resources(
    session: &Session,
    def: &ResourceDef,
    path: &str,
    query: &Query,
    request_id: &str,
) -> Result<Vec<Value>> {
    let mut url = session.service(def.subsystem).url(path)?;
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
    }

    let mut all_items = Vec::new();
    let mut next = Some(url);

    while let Some(url) = next.take() {
        let page = fetch_resources_paginated(session, def, &url, request_id).await?;
        if page.items.is_empty() {
            break;
        }
        all_items.extend(page.items);
        // A server handing back the same link would otherwise loop forever
        next = page.next.filter(|next_url| *next_url != url);
    }

    tracing::debug!("{}: {} items", def.kind, all_items.len());
    Ok(all_items)
}

/// Fetch one page of a listing
pub async fn fetch_resources_paginated(
    session: &Session,
    def: &ResourceDef,
    url: &Url,
    request_id: &str,
) -> Result<PaginatedResult> {
    let response = session.get_json(url, request_id).await?;
    let items = extract_items(&response, def.collection_key, url)?;
    let next = next_page(
        &response,
        def.pagination,
        &session.service(def.subsystem).base,
        url,
    );
    Ok(PaginatedResult { items, next })
}

/// Fetch a single raw item
pub async fn fetch_item(session: &Session, def: &ResourceDef, id: &str, request_id: &str) -> Result<(Value, Url)> {
    let url = session.service(def.subsystem).url(&def.item_path(id))?;
    let mut response = session.get_json(&url, request_id).await?;

    let item = match def.item_key {
        Some(key) => match response.get_mut(key).map(Value::take) {
            Some(item) => item,
            None => return Err(missing(key, &url)),
        },
        None => response,
    };
    Ok((item, url))
}

/// Decode raw items and enrich them in listing order. The first failure aborts.
pub async fn normalize(
    session: &Session,
    def: &ResourceDef,
    items: Vec<Value>,
    source: &Url,
    request_id: &str,
) -> Result<Vec<NormalizedResource>> {
    let mut resources = Vec::with_capacity(items.len());
    for raw in items {
        let mut resource = NormalizedResource::from_raw(def.kind, raw, source.as_str())?;
        enrich(session, def, &mut resource, request_id).await?;
        resources.push(resource);
    }
    Ok(resources)
}

/// Run the kind's secondary call for one item, if it has one
pub async fn enrich(
    session: &Session,
    def: &ResourceDef,
    resource: &mut NormalizedResource,
    request_id: &str,
) -> Result<()> {
    let Some(path) = def.enrichment_path(resource.id()) else {
        return Ok(());
    };

    let url = session.service(def.subsystem).url(&path)?;
    let response = session.get_json(&url, request_id).await?;

    match def.enrichment {
        Enrichment::ExtraSpecs(_) => {
            let specs = extract_extra_specs(response, &url)?;
            if let NormalizedResource::Flavor(flavor) = resource {
                flavor.extra_specs = specs;
            }
        },
        Enrichment::None => {},
    }
    Ok(())
}

fn extract_extra_specs(response: Value, url: &Url) -> Result<BTreeMap<String, String>> {
    let specs = match response {
        Value::Object(mut map) => map.remove("extra_specs"),
        _ => None,
    };
    match specs {
        // A missing map reads like an empty one
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(specs) => serde_json::from_value(specs).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        }),
    }
}

fn missing(field: &'static str, url: &Url) -> Error {
    Error::Decode {
        url: url.to_string(),
        source: serde_json::Error::missing_field(field),
    }
}

/// Extract the item array of a list response
fn extract_items(response: &Value, key: &'static str, url: &Url) -> Result<Vec<Value>> {
    match response.get(key) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Null) => Ok(Vec::new()),
        _ => Err(missing(key, url)),
    }
}

/// Locate the next page link, resolved to an absolute URL
pub fn next_page(response: &Value, pagination: Pagination, base: &Url, current: &Url) -> Option<Url> {
    let href = match pagination {
        Pagination::Links => response.get("links")?.get("next")?.as_str()?,
        Pagination::CollectionLinks(key) => response
            .get(key)?
            .as_array()?
            .iter()
            .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))?
            .get("href")?
            .as_str()?,
        Pagination::NextField => {
            // The image service answers with a path that repeats its version segment
            let href = response.get("next")?.as_str()?;
            if Url::parse(href).is_ok() {
                return Url::parse(href).ok();
            }
            let relative = href.trim_start_matches('/');
            let relative = relative.strip_prefix("v2/").unwrap_or(relative);
            return base.join(relative).ok();
        },
    };

    if href.is_empty() {
        return None;
    }
    current.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_identity_links() {
        let current = url("http://keystone/v3/projects");
        let response = json!({"projects": [], "links": {"next": "http://keystone/v3/projects?marker=p2", "self": "x"}});
        assert_eq!(
            next_page(&response, Pagination::Links, &current, &current).unwrap().as_str(),
            "http://keystone/v3/projects?marker=p2"
        );

        let last = json!({"projects": [], "links": {"next": null}});
        assert!(next_page(&last, Pagination::Links, &current, &current).is_none());
    }

    #[test]
    fn test_collection_links() {
        let current = url("http://nova/v2.1/flavors/detail");
        let response = json!({
            "flavors": [],
            "flavors_links": [
                {"rel": "self", "href": "http://nova/v2.1/flavors/detail"},
                {"rel": "next", "href": "http://nova/v2.1/flavors/detail?marker=f2"}
            ]
        });
        let next = next_page(&response, Pagination::CollectionLinks("flavors_links"), &current, &current);
        assert_eq!(next.unwrap().as_str(), "http://nova/v2.1/flavors/detail?marker=f2");

        let last = json!({"flavors": []});
        assert!(next_page(&last, Pagination::CollectionLinks("flavors_links"), &current, &current).is_none());
    }

    #[test]
    fn test_image_next_keeps_endpoint_prefix() {
        let base = url("http://cloud/image/v2/");
        let current = url("http://cloud/image/v2/images");
        let response = json!({"images": [], "next": "/v2/images?marker=img-2"});
        assert_eq!(
            next_page(&response, Pagination::NextField, &base, &current).unwrap().as_str(),
            "http://cloud/image/v2/images?marker=img-2"
        );
    }

    #[test]
    fn test_extract_items() {
        let page = url("http://neutron/v2.0/networks");
        let items = extract_items(&json!({"networks": [{"id": "n1"}, {"id": "n2"}]}), "networks", &page).unwrap();
        assert_eq!(items.len(), 2);
        assert!(extract_items(&json!({"subnets": []}), "networks", &page).is_err());
    }

    #[test]
    fn test_extract_extra_specs() {
        let page = url("http://nova/v2.1/flavors/f1/os-extra_specs");
        let specs = extract_extra_specs(json!({"extra_specs": {"hw:cpu_policy": "dedicated"}}), &page).unwrap();
        assert_eq!(specs["hw:cpu_policy"], "dedicated");
        assert!(extract_extra_specs(json!({}), &page).unwrap().is_empty());
        assert!(extract_extra_specs(json!({"extra_specs": null}), &page).unwrap().is_empty());
        assert!(extract_extra_specs(json!({"extra_specs": ["not", "a", "map"]}), &page).is_err());
    }
}
