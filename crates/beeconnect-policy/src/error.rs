//! Policy errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Unknown policy category '{0}'")]
    UnknownCategory(String),

    #[error("Capability check failed: {0}")]
    CheckFailed(String),
}
