//! Backend client traits: the sole API boundary between the admin core and
//! the BeeConnect REST backend. Callers depend on these traits, never on
//! `HttpClient` directly, so tests can swap in `InMemoryClient`.

pub mod error;
pub mod http;
pub mod inmemory;

use async_trait::async_trait;
use beeconnect_types::{OrgTypeId, Page, PageRequest, Policy, PolicyCategories, PolicyDraft, RoleId};
use std::fmt;

pub use error::ClientError;
pub use http::HttpClient;
pub use inmemory::InMemoryClient;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Header carrying the bearer credential on every request.
pub const AUTH_HEADER: &str = "x-auth-token";

#[async_trait]
pub trait PolicyApi: Send + Sync {
    /// `GET /policy/list`: categorized universe of policy keys.
    async fn list_policy_categories(&self) -> Result<PolicyCategories>;

    /// `GET /policy/orgType/{o}/role/{r}`: `Ok(None)` when the backend
    /// reports not-found.
    async fn get_policy_assignment(&self, org_type: OrgTypeId, role: RoleId)
        -> Result<Option<Policy>>;

    /// `POST /policy`
    async fn create_policy(&self, draft: PolicyDraft) -> Result<Policy>;

    /// `PUT /policy/id/{id}`
    async fn update_policy(&self, id: &str, draft: PolicyDraft) -> Result<Policy>;
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// One page of a list resource.
    async fn list_page(
        &self,
        resource: Resource,
        page: PageRequest,
    ) -> Result<Page<serde_json::Value>>;

    /// Backend-aggregated dashboard statistics.
    async fn fetch_stats(&self, endpoint: StatsEndpoint) -> Result<serde_json::Value>;
}

/// Paginated list resources exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Organizations,
    Applicants,
    Services,
    ServiceCategories,
    Enterprises,
    Users,
    SmsMessages,
    SmsTemplates,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Organizations,
        Resource::Applicants,
        Resource::Services,
        Resource::ServiceCategories,
        Resource::Enterprises,
        Resource::Users,
        Resource::SmsMessages,
        Resource::SmsTemplates,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Organizations => "/organization",
            Resource::Applicants => "/applicants",
            Resource::Services => "/service",
            Resource::ServiceCategories => "/service-category",
            Resource::Enterprises => "/enterprise",
            Resource::Users => "/user",
            Resource::SmsMessages => "/sms-message",
            Resource::SmsTemplates => "/sms-template",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Organizations => "organizations",
            Resource::Applicants => "applicants",
            Resource::Services => "services",
            Resource::ServiceCategories => "service-categories",
            Resource::Enterprises => "enterprises",
            Resource::Users => "users",
            Resource::SmsMessages => "sms-messages",
            Resource::SmsTemplates => "sms-templates",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregated statistics feeding the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsEndpoint {
    Applicants,
    Applications,
    GeoMap,
}

impl StatsEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            StatsEndpoint::Applicants => "/applicants/stats",
            StatsEndpoint::Applications => "/application/stats",
            StatsEndpoint::GeoMap => "/geomap/upper",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_name(resource.name()), Some(resource));
            assert!(resource.path().starts_with('/'));
        }
        assert_eq!(Resource::from_name("nope"), None);
    }
}
