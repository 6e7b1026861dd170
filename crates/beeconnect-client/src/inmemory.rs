//! In-memory backend used by tests and offline tooling.

use crate::{ClientError, PolicyApi, Resource, ResourceApi, Result, StatsEndpoint};
use async_trait::async_trait;
use beeconnect_types::{
    OrgTypeId, Page, PageMeta, PageRequest, Policy, PolicyCategories, PolicyDraft, RoleId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    categories: PolicyCategories,
    policies: Vec<Policy>,
    resources: HashMap<Resource, Vec<serde_json::Value>>,
    stats: HashMap<StatsEndpoint, serde_json::Value>,
    fail_categories: bool,
    fail_writes: Option<(u16, String)>,
    assignment_override: Option<Policy>,
    next_id: u64,
}

/// Backend double holding policies and list resources in memory.
#[derive(Default)]
pub struct InMemoryClient {
    state: Mutex<State>,
    assignment_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_categories(self, categories: PolicyCategories) -> Self {
        self.state().categories = categories;
        self
    }

    pub fn with_policy(self, policy: Policy) -> Self {
        self.state().policies.push(policy);
        self
    }

    pub fn with_resource(self, resource: Resource, rows: Vec<serde_json::Value>) -> Self {
        self.state().resources.insert(resource, rows);
        self
    }

    pub fn with_stats(self, endpoint: StatsEndpoint, value: serde_json::Value) -> Self {
        self.state().stats.insert(endpoint, value);
        self
    }

    /// Make `list_policy_categories` fail as if the credential were rejected.
    pub fn fail_categories(&self, fail: bool) {
        self.state().fail_categories = fail;
    }

    /// Make create/update fail with the given status and message.
    pub fn fail_writes(&self, status: u16, message: impl Into<String>) {
        self.state().fail_writes = Some((status, message.into()));
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.fail_categories = false;
        state.fail_writes = None;
    }

    /// Answer every assignment lookup with this row, whatever was asked.
    pub fn respond_assignment_with(&self, policy: Option<Policy>) {
        self.state().assignment_override = policy;
    }

    pub fn policies(&self) -> Vec<Policy> {
        self.state().policies.clone()
    }

    pub fn assignment_calls(&self) -> usize {
        self.assignment_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.create_calls() + self.update_calls()
    }

    fn write_failure(state: &State) -> Result<()> {
        match &state.fail_writes {
            Some((status, message)) => Err(ClientError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PolicyApi for InMemoryClient {
    async fn list_policy_categories(&self) -> Result<PolicyCategories> {
        let state = self.state();
        if state.fail_categories {
            return Err(ClientError::Unauthorized { status: 401 });
        }
        Ok(state.categories.clone())
    }

    async fn get_policy_assignment(
        &self,
        org_type: OrgTypeId,
        role: RoleId,
    ) -> Result<Option<Policy>> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if let Some(policy) = &state.assignment_override {
            return Ok(Some(policy.clone()));
        }
        Ok(state
            .policies
            .iter()
            .find(|p| p.matches(org_type, role))
            .cloned())
    }

    async fn create_policy(&self, draft: PolicyDraft) -> Result<Policy> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        Self::write_failure(&state)?;

        state.next_id += 1;
        let policy = Policy {
            id: Some(format!("policy-{}", state.next_id)),
            org_type: draft.org_type,
            role: draft.role,
            accesses: draft.accesses,
        };
        state.policies.push(policy.clone());
        Ok(policy)
    }

    async fn update_policy(&self, id: &str, draft: PolicyDraft) -> Result<Policy> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        Self::write_failure(&state)?;

        let existing = state
            .policies
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or(ClientError::NotFound)?;
        existing.org_type = draft.org_type;
        existing.role = draft.role;
        existing.accesses = draft.accesses;
        Ok(existing.clone())
    }
}

#[async_trait]
impl ResourceApi for InMemoryClient {
    async fn list_page(
        &self,
        resource: Resource,
        page: PageRequest,
    ) -> Result<Page<serde_json::Value>> {
        let state = self.state();
        let rows = state.resources.get(&resource).cloned().unwrap_or_default();
        let total = rows.len() as u64;
        let start = (page.page.saturating_sub(1) as usize).saturating_mul(page.size as usize);
        let data = rows
            .into_iter()
            .skip(start)
            .take(page.size as usize)
            .collect();
        Ok(Page {
            data,
            meta: PageMeta { total },
        })
    }

    async fn fetch_stats(&self, endpoint: StatsEndpoint) -> Result<serde_json::Value> {
        self.state()
            .stats
            .get(&endpoint)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}
