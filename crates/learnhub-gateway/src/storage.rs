//! Persistence of the session record between client runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::session::AuthSession;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Where the single serialized session record lives.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<AuthSession>, StorageError>;
    fn save(&self, session: &AuthSession) -> Result<(), StorageError>;
    /// Deletes the record. Deleting a missing record is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the record in process memory only.
#[derive(Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<AuthSession>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<AuthSession>, StorageError> {
        Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &AuthSession) -> Result<(), StorageError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }
}

/// Stores the record as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<AuthSession>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let session: AuthSession = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &AuthSession) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CredentialScheme, Principal, Role};

    fn session() -> AuthSession {
        AuthSession::new(
            "secret-token",
            CredentialScheme::Token,
            Principal::new("s@example.com", Role::Student),
        )
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert!(storage.load().unwrap().is_none());

        storage.save(&session()).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.token, "secret-token");
        assert_eq!(loaded.scheme, CredentialScheme::Token);
        assert_eq!(loaded.principal.role, Role::Student);

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_file_storage_corrupt_record() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(matches!(storage.load(), Err(StorageError::Serde(_))));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::default();
        storage.save(&session()).unwrap();
        assert!(storage.load().unwrap().is_some());
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
