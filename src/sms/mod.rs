//! Bulk SMS support
//!
//! The send screen accepts a CSV of recipients; this module validates it
//! before anything is sent.

mod recipients;

pub use recipients::{
    normalize_phone, validate_recipients, validate_recipients_file, InvalidReason,
    InvalidRecipient, RecipientReport,
};
