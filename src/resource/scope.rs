//! Scope restriction and the Project fallback
//!
//! A session works inside one region and one project. Region and Project
//! results are narrowed to that scope here. When the identity service refuses
//! to list or show projects to the caller, the caller's own project set is
//! used instead: the user ID comes from the auth result, the user's projects
//! are paged in full, and the configured project is picked out of them.

use super::fetcher;
use super::model::{NormalizedResource, Project, Region};
use super::registry::{get_resource, user_projects_path};
use super::kind::ResourceKind;
use crate::error::{Error, Result};
use crate::openstack::Session;
use std::future::Future;

/// Region and project the session is restricted to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    pub project_name: String,
    pub project_id: String,
    pub region_name: String,
}

impl ScopeContext {
    /// Regions are matched on their ID against the configured region name
    pub fn admits_region(&self, region: &Region) -> bool {
        region.id == self.region_name
    }

    /// Projects are matched on name, or on ID when only a project ID is configured
    pub fn admits_project(&self, project: &Project) -> bool {
        if !self.project_name.is_empty() {
            project.name == self.project_name
        } else if !self.project_id.is_empty() {
            project.id == self.project_id
        } else {
            false
        }
    }

    /// Whether a normalized resource lies inside the scope. Unscoped kinds always do.
    pub fn admits(&self, resource: &NormalizedResource) -> bool {
        match resource {
            NormalizedResource::Region(region) => self.admits_region(region),
            NormalizedResource::Project(project) => self.admits_project(project),
            _ => true,
        }
    }
}

/// Where the fallback gets the caller's identity and projects from
pub(crate) trait IdentityDirectory {
    fn scope(&self) -> &ScopeContext;

    /// ID of the authenticated user
    fn authenticated_user_id(&self) -> Result<String>;

    /// Every project the user is a member of, all pages
    fn list_user_projects(&self, user_id: &str) -> impl Future<Output = Result<Vec<Project>>> + Send;
}

impl IdentityDirectory for Session {
    fn scope(&self) -> &ScopeContext {
        Session::scope(self)
    }

    fn authenticated_user_id(&self) -> Result<String> {
        self.auth_result()
            .map(|result| result.user.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(Error::NoAuthResult)
    }

    async fn list_user_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let def = get_resource(ResourceKind::Project);
        let request_id = super::dispatch::new_request_id();
        let path = user_projects_path(user_id);
        let source = self.service(def.subsystem).url(&path)?;

        let items = fetcher::fetch_resources(self, def, &path, &Vec::new(), &request_id).await?;
        items
            .into_iter()
            .map(|raw| {
                serde_json::from_value(raw).map_err(|source_err| Error::Decode {
                    url: source.to_string(),
                    source: source_err,
                })
            })
            .collect()
    }
}

/// Whether an error on `kind` should be answered from the caller's own projects
pub(crate) fn should_fall_back(kind: ResourceKind, err: &Error) -> bool {
    kind == ResourceKind::Project && err.is_forbidden()
}

/// The caller's own projects, narrowed to the configured project (zero or one)
pub(crate) async fn user_projects<D: IdentityDirectory>(directory: &D) -> Result<Vec<Project>> {
    let user_id = directory.authenticated_user_id()?;
    let projects = directory.list_user_projects(&user_id).await?;
    let total = projects.len();

    let scope = directory.scope();
    let projects: Vec<Project> = projects
        .into_iter()
        .filter(|project| scope.admits_project(project))
        .collect();

    tracing::debug!(
        "user {} is a member of {} projects, {} in scope",
        user_id,
        total,
        projects.len()
    );
    Ok(projects)
}

/// One of the caller's own projects. Anything outside the set is reported as not found.
pub(crate) async fn user_project<D: IdentityDirectory>(directory: &D, id: &str) -> Result<Project> {
    user_projects(directory)
        .await?
        .into_iter()
        .find(|project| project.id == id)
        .ok_or_else(|| Error::NotFound {
            resource: format!("project {}", id),
        })
}
