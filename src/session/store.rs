//! Durable session record storage.
//!
//! Every implementation stores the encoded form produced by
//! [`SessionRecord::encode`], so there is exactly one serialization boundary.

use crate::error::SessionError;
use beeconnect_types::SessionRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>, SessionError>;
    fn save(&self, record: &SessionRecord) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session record kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(SessionRecord::decode(&raw)?))
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, record.encode()?)?;
        tracing::debug!(path = %self.path.display(), "session record saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, holding the encoded record like the file store does.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw stored text, bypassing encode (for corrupt-record tests).
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        match self.slot().as_deref() {
            Some(raw) => Ok(Some(SessionRecord::decode(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        *self.slot() = Some(record.encode()?);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beeconnect_types::{OrgTypeId, RoleId};

    fn record() -> SessionRecord {
        SessionRecord::new("tok", "sess-1")
            .with_name("Jean")
            .with_role(RoleId::ADMIN)
            .with_org("org-1", "BeeConnect HQ", OrgTypeId::PROGRAM)
            .with_policies(["manage-users", "view-reports"])
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&record()).unwrap();
        assert_eq!(store.load().unwrap(), Some(record()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn file_store_surfaces_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{oops").unwrap();
        let err = FileSessionStore::new(path).load().unwrap_err();
        assert!(matches!(err, SessionError::Record(_)));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        store.save(&record()).unwrap();
        assert_eq!(store.load().unwrap(), Some(record()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
