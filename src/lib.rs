//! BeeConnect admin core
//!
//! Client-side logic of the BeeConnect administration console, independent
//! of any UI toolkit:
//!
//! - **navigation**: declarative sidebar menu, filtered per user, plus the
//!   active/expanded/collapsed state that follows the current route
//! - **permissions**: the role × organization-type policy editor
//! - **session**: persisted session record, route guard, credential expiry
//!   watch and the expiry prompt
//! - **sms**: bulk SMS recipient file validation
//!
//! # Architecture
//!
//! ```text
//!             SessionStore ──► SessionContext ──► UserCapabilities
//!                                   ▲                    │
//!     SessionGuard (expiry timer) ──┘                    ▼
//!                                         navigation::build_for_user
//!                                                        │
//!                                                        ▼
//!     PolicyApi (HttpClient / InMemoryClient)        MenuItem tree ──► MenuState
//!                  │
//!                  ▼
//!            PolicyEditor ──► CheckedPolicySet ──► save (create | update)
//! ```
//!
//! Access rules live in `beeconnect-policy`, wire types in
//! `beeconnect-types`, and the backend boundary in `beeconnect-client`.

pub mod config;
pub mod error;
pub mod navigation;
pub mod permissions;
pub mod session;
pub mod sms;

pub use config::AppConfig;
pub use error::{AppError, Result};

pub use beeconnect_client as client;
pub use beeconnect_policy as policy;
pub use beeconnect_types as types;
