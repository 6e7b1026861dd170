//! Shared API Types for BeeConnect
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing the
//! backend boundary and the client-side session record.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐  JSON + x-auth-token  ┌──────────────────┐
//! │  BeeConnect REST │ ◄───────────────────► │  Admin core      │
//! │  backend         │                       │  (this workspace)│
//! └──────────────────┘                       └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All wire types live here - no inline struct definitions at call sites
//! 2. Backend JSON is camelCase
//! 3. Opaque identifiers are carried as strings

pub mod session;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use session::{SessionRecord, SessionRecordError};

/// Fallback shown when a failed call carries no readable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Numeric role identifier as issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub i32);

impl RoleId {
    pub const ADMIN: RoleId = RoleId(1);
    pub const MANAGER: RoleId = RoleId(2);
    pub const OFFICER: RoleId = RoleId(3);
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric organization-type identifier as issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgTypeId(pub i32);

impl OrgTypeId {
    /// The program operator (BeeConnect itself).
    pub const PROGRAM: OrgTypeId = OrgTypeId(1);
    /// Implementing partner organizations.
    pub const PARTNER: OrgTypeId = OrgTypeId(2);
}

impl fmt::Display for OrgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Helper to deserialize a numeric or string identifier into String
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer identifier")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: serde::Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_option(IdVisitor)
}

// ============================================================================
// POLICY API
// ============================================================================

/// Access set assigned to one (organization type, role) pair.
///
/// `id` is `None` until the policy has been persisted once; save branches
/// between create and update on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(
        default,
        alias = "_id",
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub org_type: OrgTypeId,
    pub role: RoleId,
    #[serde(default)]
    pub accesses: Vec<String>,
}

impl Policy {
    /// True when this row belongs to exactly the requested pair.
    pub fn matches(&self, org_type: OrgTypeId, role: RoleId) -> bool {
        self.org_type == org_type && self.role == role
    }
}

/// Body of `POST /policy` and `PUT /policy/id/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDraft {
    pub org_type: OrgTypeId,
    pub role: RoleId,
    pub accesses: Vec<String>,
}

/// Universe of assignable policy keys grouped by category
/// (`GET /policy/list`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyCategories(pub BTreeMap<String, Vec<String>>);

impl PolicyCategories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category<I, S>(mut self, category: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(category.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys_of(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Flattened set of every known key.
    pub fn searchable(&self) -> BTreeSet<String> {
        self.0.values().flatten().cloned().collect()
    }
}

// ============================================================================
// LIST API
// ============================================================================

/// Pagination query (`?page=&size=`), 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
}

/// List response body: `{data, meta: {total}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Structured error body returned by the backend on failure.
///
/// Shapes seen in the wild: `{"message": "..."}`, `{"error": "..."}` and
/// `{"error": {"message": "..."}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Human-readable message carried by the envelope, if any.
    pub fn message(&self) -> Option<String> {
        if let Some(m) = self.message.as_deref().map(str::trim) {
            if !m.is_empty() {
                return Some(m.to_string());
            }
        }
        match &self.error {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                Some(s.trim().to_string())
            }
            Some(serde_json::Value::Object(obj)) => obj
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            _ => None,
        }
    }

    /// Extract a message from a raw response body, falling back to the
    /// generic message.
    pub fn message_from_body(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_accepts_numeric_and_underscore_ids() {
        let p: Policy =
            serde_json::from_str(r#"{"_id": 42, "orgType": 2, "role": 3, "accesses": ["a"]}"#)
                .unwrap();
        assert_eq!(p.id.as_deref(), Some("42"));
        assert!(p.matches(OrgTypeId(2), RoleId(3)));
        assert!(!p.matches(OrgTypeId(2), RoleId(1)));

        let p: Policy = serde_json::from_str(r#"{"orgType": 1, "role": 1}"#).unwrap();
        assert_eq!(p.id, None);
        assert!(p.accesses.is_empty());
    }

    #[test]
    fn draft_serializes_camel_case() {
        let draft = PolicyDraft {
            org_type: OrgTypeId::PARTNER,
            role: RoleId::OFFICER,
            accesses: vec!["view-applicants".into()],
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["orgType"], 2);
        assert_eq!(json["role"], 3);
        assert_eq!(json["accesses"][0], "view-applicants");
    }

    #[test]
    fn categories_flatten_to_searchable() {
        let cats = PolicyCategories::new()
            .with_category("A", ["p1", "p2"])
            .with_category("B", ["p3"]);
        let searchable = cats.searchable();
        assert_eq!(searchable.len(), 3);
        assert!(searchable.contains("p3"));
        assert_eq!(cats.keys_of("A").map(|k| k.len()), Some(2));
        assert!(cats.keys_of("C").is_none());
    }

    #[test]
    fn page_defaults_missing_meta() {
        let page: Page<serde_json::Value> = serde_json::from_str(r#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total, 0);
    }

    #[test]
    fn page_request_clamps_to_one() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.size, 1);
    }

    #[test]
    fn envelope_message_shapes() {
        assert_eq!(
            ErrorEnvelope::message_from_body(r#"{"message": "Role is required"}"#),
            "Role is required"
        );
        assert_eq!(
            ErrorEnvelope::message_from_body(r#"{"error": "Duplicate policy"}"#),
            "Duplicate policy"
        );
        assert_eq!(
            ErrorEnvelope::message_from_body(r#"{"error": {"message": "Forbidden"}}"#),
            "Forbidden"
        );
        assert_eq!(
            ErrorEnvelope::message_from_body("<html>502</html>"),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            ErrorEnvelope::message_from_body(r#"{"message": "  "}"#),
            GENERIC_ERROR_MESSAGE
        );
    }
}
