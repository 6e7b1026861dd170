//! Error handling for the BeeConnect admin core
//!
//! One `thiserror` enum per subsystem, aggregated by [`AppError`].

use thiserror::Error;

pub use beeconnect_client::ClientError;
pub use beeconnect_policy::PolicyError;

/// Main error type for the admin core
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Policy editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("SMS error: {0}")]
    Sms(#[from] SmsError),

    #[error("Backend error: {0}")]
    Client(#[from] ClientError),
}

/// Errors in the static menu declaration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Duplicate menu key '{key}'")]
    DuplicateKey { key: String },

    #[error("Menu key must not be empty (label '{label}')")]
    EmptyKey { label: String },
}

/// Errors raised by the permission editor
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Session persistence errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Record(#[from] beeconnect_types::SessionRecordError),
}

/// Bulk SMS recipient file errors
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("Recipient file is empty")]
    EmptyFile,

    #[error("Recipient file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
