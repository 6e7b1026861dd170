//! Capability predicates.

use beeconnect_types::{OrgTypeId, RoleId, SessionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Three-dimensional visibility predicate.
///
/// An empty dimension places no restriction on that dimension. A non-empty
/// `policies` set needs at least one key in common with the user; non-empty
/// `roles`/`org_types` need the user's value to be a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default)]
    pub policies: BTreeSet<String>,
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
    #[serde(default)]
    pub org_types: BTreeSet<OrgTypeId>,
}

impl Capability {
    /// No restriction on any dimension.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Visible to holders of any of the given policy keys.
    pub fn any_of<I, S>(policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            policies: policies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn with_org_types(mut self, org_types: impl IntoIterator<Item = OrgTypeId>) -> Self {
        self.org_types.extend(org_types);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.policies.is_empty() && self.roles.is_empty() && self.org_types.is_empty()
    }

    /// Evaluate against the current user.
    pub fn allows(&self, user: &UserCapabilities) -> bool {
        let policy_ok =
            self.policies.is_empty() || !self.policies.is_disjoint(&user.policies);
        let role_ok = self.roles.is_empty()
            || user.role.is_some_and(|r| self.roles.contains(&r));
        let org_ok = self.org_types.is_empty()
            || user.org_type.is_some_and(|o| self.org_types.contains(&o));
        policy_ok && role_ok && org_ok
    }
}

/// The signed-in user's side of a capability check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCapabilities {
    pub policies: BTreeSet<String>,
    pub role: Option<RoleId>,
    pub org_type: Option<OrgTypeId>,
}

impl UserCapabilities {
    pub fn new<I, S>(policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            policies: policies.into_iter().map(Into::into).collect(),
            role: None,
            org_type: None,
        }
    }

    /// A user with nothing granted (signed-out view).
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_org_type(mut self, org_type: OrgTypeId) -> Self {
        self.org_type = Some(org_type);
        self
    }
}

impl From<&SessionRecord> for UserCapabilities {
    fn from(record: &SessionRecord) -> Self {
        Self {
            policies: record.policies.iter().cloned().collect(),
            role: record.role,
            org_type: record.org_type,
        }
    }
}
