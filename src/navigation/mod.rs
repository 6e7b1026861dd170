//! Navigation Module for the admin sidebar
//!
//! This module turns a static, hand-authored menu declaration into the
//! access-filtered sidebar for the signed-in user, and tracks which item is
//! active and which group is open. It includes:
//!
//! - `menu`: `MenuNode` declarations, `MenuDefinition` and the filtering `build`
//! - `state`: `locate_active`, accordion `toggle_expand`, and `MenuState`
//! - `beeconnect`: the BeeConnect sidebar declaration
//!
//! ## Usage Example
//!
//! ```
//! use beeconnect::navigation::beeconnect::sidebar;
//! use beeconnect::navigation::{build_for_user, MenuState};
//! use beeconnect_policy::UserCapabilities;
//! use beeconnect_types::RoleId;
//!
//! # fn main() -> Result<(), beeconnect::error::NavigationError> {
//! let user = UserCapabilities::new(["view-applicants"]).with_role(RoleId::MANAGER);
//! let tree = build_for_user(&sidebar()?, &user);
//! let state = MenuState::initial(&tree, "/dashboard/applicants");
//! assert_eq!(state.active(), Some("applicants"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Invariants
//!
//! - Menu keys are unique across the whole declaration
//! - At most one group is expanded at a time (`MenuState::expanded` is a
//!   single optional key)
//! - A capability check that errors hides the node

pub mod beeconnect;
pub mod menu;
pub mod state;

pub use menu::{build, build_for_user, MenuDefinition, MenuItem, MenuNode};
pub use state::{locate_active, toggle_expand, ActiveLocation, MenuState, Navigator, Viewport};
