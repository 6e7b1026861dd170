//! Recipient CSV validation.

use crate::error::SmsError;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Header that selects the phone column (case-insensitive).
const PHONE_HEADER: &str = "phone";

/// Optional leading '+', then 9 to 15 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{9,15}$").expect("phone pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Missing,
    Malformed,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Missing => write!(f, "missing phone number"),
            InvalidReason::Malformed => write!(f, "not a valid phone number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecipient {
    /// 1-based line in the source file.
    pub line: u64,
    pub raw: String,
    pub reason: InvalidReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientReport {
    /// Normalized numbers, first occurrence order.
    pub valid: Vec<String>,
    pub invalid: Vec<InvalidRecipient>,
    pub duplicates: usize,
}

impl RecipientReport {
    pub fn rows(&self) -> usize {
        self.valid.len() + self.invalid.len() + self.duplicates
    }

    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Strip separators and check the result looks like a phone number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&compact).then_some(compact)
}

pub fn validate_recipients_file(path: &Path) -> Result<RecipientReport, SmsError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect(reader)
}

pub fn validate_recipients<R: io::Read>(source: R) -> Result<RecipientReport, SmsError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    collect(reader)
}

fn collect<R: io::Read>(mut reader: csv::Reader<R>) -> Result<RecipientReport, SmsError> {
    let mut records = reader.records();

    let first = match records.next() {
        Some(record) => record?,
        None => return Err(SmsError::EmptyFile),
    };

    let header_column = first
        .iter()
        .position(|h| h.eq_ignore_ascii_case(PHONE_HEADER));
    let column = header_column.unwrap_or(0);

    let mut report = RecipientReport::default();
    let mut seen = HashSet::new();

    let mut check = |record: &csv::StringRecord| {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw = record.get(column).unwrap_or("");
        if raw.is_empty() {
            report.invalid.push(InvalidRecipient {
                line,
                raw: raw.to_string(),
                reason: InvalidReason::Missing,
            });
            return;
        }
        match normalize_phone(raw) {
            Some(phone) if seen.contains(&phone) => report.duplicates += 1,
            Some(phone) => {
                seen.insert(phone.clone());
                report.valid.push(phone);
            }
            None => report.invalid.push(InvalidRecipient {
                line,
                raw: raw.to_string(),
                reason: InvalidReason::Malformed,
            }),
        }
    };

    if header_column.is_none() {
        check(&first);
    }
    for record in records {
        check(&record?);
    }

    if report.rows() == 0 {
        return Err(SmsError::EmptyFile);
    }

    debug!(
        valid = report.valid.len(),
        invalid = report.invalid.len(),
        duplicates = report.duplicates,
        "recipient file checked"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_formats() {
        assert_eq!(
            normalize_phone("+221 77-123 45 67").as_deref(),
            Some("+221771234567")
        );
        assert_eq!(normalize_phone("(77) 123-4567").as_deref(), Some("771234567"));
        assert_eq!(normalize_phone("12345"), None);
        assert_eq!(normalize_phone("77a1234567"), None);
        assert_eq!(normalize_phone("++221771234567"), None);
        assert_eq!(normalize_phone("1234567890123456"), None);
    }

    #[test]
    fn uses_phone_header_column() {
        let csv = "name,Phone\nAwa,+221 77 123 45 67\nMoussa,bad\nFatou,771234568\n";
        let report = validate_recipients(csv.as_bytes()).unwrap();

        assert_eq!(report.valid, vec!["+221771234567", "771234568"]);
        assert_eq!(
            report.invalid,
            vec![InvalidRecipient {
                line: 3,
                raw: "bad".into(),
                reason: InvalidReason::Malformed,
            }]
        );
        assert_eq!(report.duplicates, 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn falls_back_to_first_column_without_header() {
        let csv = "771234567\n77 123 45 67\n\n771234599\n";
        let report = validate_recipients(csv.as_bytes()).unwrap();

        assert_eq!(report.valid, vec!["771234567", "771234599"]);
        assert_eq!(report.duplicates, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn empty_cells_are_missing() {
        let csv = "phone,name\n,Awa\n771234567,Moussa\n";
        let report = validate_recipients(csv.as_bytes()).unwrap();
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].reason, InvalidReason::Missing);
        assert_eq!(report.invalid[0].line, 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            validate_recipients("".as_bytes()),
            Err(SmsError::EmptyFile)
        ));
        assert!(matches!(
            validate_recipients("phone\n".as_bytes()),
            Err(SmsError::EmptyFile)
        ));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipients.csv");
        std::fs::write(&path, "phone\n771234567\n").unwrap();
        let report = validate_recipients_file(&path).unwrap();
        assert_eq!(report.valid, vec!["771234567"]);
    }
}
