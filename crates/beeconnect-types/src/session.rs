//! Client-persisted session record.
//!
//! Written once at login, read at start-up, cleared at logout. All reads
//! and writes go through [`SessionRecord::encode`] / [`SessionRecord::decode`].

use crate::{OrgTypeId, RoleId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionRecordError {
    #[error("Session record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Session record has no credential")]
    MissingCredential,
}

/// Denormalized user fields captured at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Bearer credential sent as `x-auth-token`.
    pub token: String,
    /// Server-side session identifier; absent means "not logged in".
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<RoleId>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub org_type: Option<OrgTypeId>,
    /// Granted policy keys.
    #[serde(default)]
    pub policies: Vec<String>,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            session_id: Some(session_id.into()),
            name: String::new(),
            role: None,
            org_id: None,
            org_name: None,
            org_type: None,
            policies: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_org(
        mut self,
        org_id: impl Into<String>,
        org_name: impl Into<String>,
        org_type: OrgTypeId,
    ) -> Self {
        self.org_id = Some(org_id.into());
        self.org_name = Some(org_name.into());
        self.org_type = Some(org_type);
        self
    }

    pub fn with_policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies = policies.into_iter().map(Into::into).collect();
        self
    }

    pub fn encode(&self) -> Result<String, SessionRecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self, SessionRecordError> {
        let record: SessionRecord = serde_json::from_str(raw)?;
        if record.token.trim().is_empty() {
            return Err(SessionRecordError::MissingCredential);
        }
        Ok(record)
    }

    pub fn has_session(&self) -> bool {
        self.session_id.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// User name for display, `-` when the backend sent none.
    pub fn display_name(&self) -> &str {
        match self.name.trim() {
            "" => "-",
            name => name,
        }
    }
}
