//! Permission editing for an (organization type, role) pair.
//!
//! `PolicyEditor` loads the key universe and the current assignment through
//! a [`beeconnect_client::PolicyApi`], lets an admin toggle category
//! checkbox groups, and persists the pruned result.

pub mod editor;
pub mod notice;

pub use editor::{AssignmentOutcome, AssignmentRequest, PolicyEditor, Selection};
pub use notice::{Notice, NoticeLevel};
