//! Dispatch facade
//!
//! `Session::list` and `Session::get` route a kind to its registry row, walk
//! the pages, enrich, narrow to the session scope and answer a denied
//! Project call from the caller's own projects. Every error leaving here
//! carries the operation, kind and ID it belongs to.

use super::fetcher;
use super::filter::ListFilter;
use super::kind::ResourceKind;
use super::model::NormalizedResource;
use super::registry::{get_resource, ResourceDef, ScopeFilter};
use super::scope;
use crate::error::{Error, Operation, Result};
use crate::openstack::Session;

/// Per-call request ID sent as `X-OpenStack-Request-ID`
pub(crate) fn new_request_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4())
}

impl Session {
    /// List every resource of `kind` matching `filter`, across all pages
    pub async fn list(&self, kind: ResourceKind, filter: &ListFilter) -> Result<Vec<NormalizedResource>> {
        self.list_inner(kind, filter)
            .await
            .map_err(|e| e.in_call(Operation::List, kind, None))
    }

    /// Get one resource of `kind` by ID
    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<NormalizedResource> {
        self.get_inner(kind, id)
            .await
            .map_err(|e| e.in_call(Operation::Get, kind, Some(id)))
    }

    async fn list_inner(&self, kind: ResourceKind, filter: &ListFilter) -> Result<Vec<NormalizedResource>> {
        let def = get_resource(kind);
        let mut query = filter.query_for(kind)?;
        let request_id = new_request_id();

        if def.scope == ScopeFilter::Project {
            // Only the configured project is ever listed
            query.retain(|(key, _)| *key != "name");
            let name = &self.scope().project_name;
            if !name.is_empty() {
                query.push(("name", name.clone()));
            }
        }

        tracing::debug!("list {} [{}]", kind, request_id);

        let items = match fetcher::fetch_resources(self, def, def.list_path, &query, &request_id).await {
            Ok(items) => items,
            Err(e) if scope::should_fall_back(kind, &e) => {
                tracing::info!("listing projects is forbidden, using the caller's own projects: {}", e);
                let projects = scope::user_projects(self).await?;
                return Ok(projects.into_iter().map(NormalizedResource::Project).collect());
            },
            Err(e) => return Err(e),
        };

        let source = self.service(def.subsystem).url(def.list_path)?;
        let resources = fetcher::normalize(self, def, items, &source, &request_id).await?;
        Ok(self.narrow(def, resources))
    }

    async fn get_inner(&self, kind: ResourceKind, id: &str) -> Result<NormalizedResource> {
        let def = get_resource(kind);
        let request_id = new_request_id();

        tracing::debug!("get {} {} [{}]", kind, id, request_id);

        let (raw, source) = match fetcher::fetch_item(self, def, id, &request_id).await {
            Ok(fetched) => fetched,
            Err(e) if scope::should_fall_back(kind, &e) => {
                tracing::info!("showing project {} is forbidden, using the caller's own projects: {}", id, e);
                let project = scope::user_project(self, id).await?;
                return Ok(NormalizedResource::Project(project));
            },
            Err(e) => return Err(e),
        };

        let mut resource = NormalizedResource::from_raw(kind, raw, source.as_str())?;
        fetcher::enrich(self, def, &mut resource, &request_id).await?;

        if def.scope != ScopeFilter::None && !self.scope().admits(&resource) {
            return Err(Error::NotFound {
                resource: format!("{} {} is outside the session scope", kind, id),
            });
        }
        Ok(resource)
    }

    fn narrow(&self, def: &ResourceDef, resources: Vec<NormalizedResource>) -> Vec<NormalizedResource> {
        if def.scope == ScopeFilter::None {
            return resources;
        }
        let total = resources.len();
        let scoped: Vec<_> = resources
            .into_iter()
            .filter(|resource| self.scope().admits(resource))
            .collect();
        tracing::debug!("{}: {} of {} in scope", def.kind, scoped.len(), total);
        scoped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = new_request_id();
        let b = new_request_id();
        assert!(a.starts_with("req-"));
        assert_eq!(a.len(), "req-".len() + 36);
        assert_ne!(a, b);
    }
}
