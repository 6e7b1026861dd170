//! Access control model for BeeConnect navigation and permission editing.
//!
//! This crate provides:
//!
//! - **Capability**: The `(policies, roles, orgTypes)` predicate that gates a
//!   menu item or UI affordance
//! - **UserCapabilities**: What the signed-in user brings to that predicate
//! - **CheckedPolicySet**: Per-category working copy of a policy's accesses
//! - **PolicyDiff**: Keys granted/revoked relative to a loaded assignment
//!
//! # Architecture
//!
//! ```text
//! SessionRecord ──► UserCapabilities ──┐
//!                                      ├──► Capability::allows ──► visible?
//! static menu ──► Capability ──────────┘
//!
//! Policy.accesses ──► CheckedPolicySet ──toggle_category──► flattened()
//!                                                │
//!                                   prune_to(searchable) ──► save body
//! ```
//!
//! # Example
//!
//! ```
//! use beeconnect_policy::{Capability, UserCapabilities};
//! use beeconnect_types::RoleId;
//!
//! let cap = Capability::any_of(["manage-users"]).with_roles([RoleId::ADMIN]);
//! let user = UserCapabilities::new(["manage-users"]).with_role(RoleId::ADMIN);
//! assert!(cap.allows(&user));
//! ```

mod capability;
mod checked;
mod error;

pub use capability::{Capability, UserCapabilities};
pub use checked::{CheckedPolicySet, PolicyDiff};
pub use error::PolicyError;

pub type Result<T> = std::result::Result<T, PolicyError>;
