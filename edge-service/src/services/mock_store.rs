//! In-memory store used by tests.
//!
//! Records every store call by operation name and can be told to fail a given
//! operation, so callers can assert which queries ran and how faults surface.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::store::{PermissionStore, TopologyStore, TopologyWriter};
use crate::models::{
    Action, CreateResource, CreateSite, ExitNode, Resource, RoleAction, Site, Target,
    UpdateResource, UserAction,
};

#[derive(Default)]
struct MockState {
    memberships: HashMap<(Uuid, i64), i64>,
    user_actions: HashSet<UserAction>,
    role_actions: HashSet<RoleAction>,
    exit_nodes: HashMap<i64, ExitNode>,
    sites: Vec<Site>,
    resources: Vec<Resource>,
    targets: Vec<Target>,
    next_site_id: i64,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
}

pub struct MockStore {
    state: Mutex<MockState>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_site_id: 1,
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call and return the injected failure for it, if any.
    fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, MockState>, anyhow::Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock store mutex poisoned: {}", e))?;
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(anyhow::anyhow!("Injected failure in {}", operation));
        }
        Ok(state)
    }

    pub fn add_membership(&self, user_id: Uuid, org_id: i64, role_id: i64) {
        self.state().memberships.insert((user_id, org_id), role_id);
    }

    pub fn remove_membership(&self, user_id: Uuid, org_id: i64) {
        self.state().memberships.remove(&(user_id, org_id));
    }

    pub fn grant_user_action(&self, user_id: Uuid, action: Action, org_id: i64) {
        self.state().user_actions.insert(UserAction {
            user_id,
            action,
            org_id,
        });
    }

    pub fn revoke_user_action(&self, user_id: Uuid, action: Action, org_id: i64) {
        self.state().user_actions.remove(&UserAction {
            user_id,
            action,
            org_id,
        });
    }

    pub fn grant_role_action(&self, role_id: i64, action: Action, org_id: i64) {
        self.state().role_actions.insert(RoleAction {
            role_id,
            action,
            org_id,
        });
    }

    pub fn add_exit_node(&self, exit_node: ExitNode) {
        self.state().exit_nodes.insert(exit_node.exit_node_id, exit_node);
    }

    pub fn add_site(&self, site: Site) {
        let mut state = self.state();
        state.next_site_id = state.next_site_id.max(site.site_id + 1);
        state.sites.push(site);
    }

    pub fn add_resource(&self, resource: Resource) {
        self.state().resources.push(resource);
    }

    pub fn add_target(&self, target: Target) {
        self.state().targets.push(target);
    }

    /// Make every subsequent call to `operation` fail.
    pub fn fail_operation(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    /// Operation names of every call so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == operation).count()
    }

    pub fn sites(&self) -> Vec<Site> {
        self.state().sites.clone()
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.state().resources.clone()
    }
}

#[async_trait]
impl PermissionStore for MockStore {
    async fn find_membership_role(
        &self,
        user_id: Uuid,
        org_id: i64,
    ) -> Result<Option<i64>, anyhow::Error> {
        let state = self.enter("find_membership_role")?;
        Ok(state.memberships.get(&(user_id, org_id)).copied())
    }

    async fn has_user_action(
        &self,
        user_id: Uuid,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error> {
        let state = self.enter("has_user_action")?;
        Ok(state.user_actions.contains(&UserAction {
            user_id,
            action,
            org_id,
        }))
    }

    async fn has_role_action(
        &self,
        role_id: i64,
        action: Action,
        org_id: i64,
    ) -> Result<bool, anyhow::Error> {
        let state = self.enter("has_role_action")?;
        Ok(state.role_actions.contains(&RoleAction {
            role_id,
            action,
            org_id,
        }))
    }
}

#[async_trait]
impl TopologyStore for MockStore {
    async fn find_exit_node(&self, exit_node_id: i64) -> Result<Option<ExitNode>, anyhow::Error> {
        let state = self.enter("find_exit_node")?;
        Ok(state.exit_nodes.get(&exit_node_id).cloned())
    }

    async fn list_sites_for_exit_node(
        &self,
        exit_node_id: i64,
    ) -> Result<Vec<Site>, anyhow::Error> {
        let state = self.enter("list_sites_for_exit_node")?;
        Ok(state
            .sites
            .iter()
            .filter(|s| s.exit_node_id == Some(exit_node_id))
            .cloned()
            .collect())
    }

    async fn list_resources_for_site(&self, site_id: i64) -> Result<Vec<Resource>, anyhow::Error> {
        let state = self.enter("list_resources_for_site")?;
        Ok(state
            .resources
            .iter()
            .filter(|r| r.site_id == site_id)
            .cloned()
            .collect())
    }

    async fn list_targets_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Target>, anyhow::Error> {
        let state = self.enter("list_targets_for_resource")?;
        Ok(state
            .targets
            .iter()
            .filter(|t| t.resource_id == resource_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TopologyWriter for MockStore {
    async fn insert_site(&self, org_id: i64, input: &CreateSite) -> Result<Site, anyhow::Error> {
        let mut state = self.enter("insert_site")?;
        let site = Site {
            site_id: state.next_site_id,
            org_id,
            exit_node_id: input.exit_node_id,
            name: input.name.clone(),
            subdomain: input.subdomain.clone(),
            pub_key: input.pub_key.clone(),
            subnet: input.subnet.clone(),
            created_utc: Utc::now(),
        };
        state.next_site_id += 1;
        state.sites.push(site.clone());
        Ok(site)
    }

    async fn find_site(&self, site_id: i64, org_id: i64) -> Result<Option<Site>, anyhow::Error> {
        let state = self.enter("find_site")?;
        Ok(state
            .sites
            .iter()
            .find(|s| s.site_id == site_id && s.org_id == org_id)
            .cloned())
    }

    async fn insert_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        site_id: i64,
        input: &CreateResource,
    ) -> Result<Resource, anyhow::Error> {
        let mut state = self.enter("insert_resource")?;
        let resource = Resource {
            resource_id,
            site_id,
            org_id,
            name: input.name.clone(),
            subdomain: input.subdomain.clone(),
            created_utc: Utc::now(),
        };
        state.resources.push(resource.clone());
        Ok(resource)
    }

    async fn find_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
    ) -> Result<Option<Resource>, anyhow::Error> {
        let state = self.enter("find_resource")?;
        Ok(state
            .resources
            .iter()
            .find(|r| r.resource_id == resource_id && r.org_id == org_id)
            .cloned())
    }

    async fn update_resource(
        &self,
        resource_id: Uuid,
        org_id: i64,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, anyhow::Error> {
        let mut state = self.enter("update_resource")?;
        let Some(resource) = state
            .resources
            .iter_mut()
            .find(|r| r.resource_id == resource_id && r.org_id == org_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            resource.name = name.clone();
        }
        if let Some(subdomain) = &input.subdomain {
            resource.subdomain = Some(subdomain.clone());
        }
        Ok(Some(resource.clone()))
    }
}
