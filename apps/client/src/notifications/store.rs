//! Durable storage for the notification log: one key, written after every
//! mutation and read once at startup.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Notification;
use crate::errors::ClientError;

/// Key under which the serialized log is kept.
pub const STORAGE_KEY: &str = "cv_analyzer_notifications";

pub trait NotificationStore: Send + Sync {
    /// Returns an empty log when nothing was stored yet.
    fn load(&self) -> Result<Vec<Notification>, ClientError>;

    fn save(&self, notifications: &[Notification]) -> Result<(), ClientError>;
}

fn corrupt(e: serde_json::Error) -> ClientError {
    ClientError::Storage(format!("Notification log is not valid JSON: {e}"))
}

/// JSON file on local disk. Writes go through a temp file in the same
/// directory and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Notification>, ClientError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(corrupt)
    }

    fn save(&self, notifications: &[Notification]) -> Result<(), ClientError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, notifications).map_err(corrupt)?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| ClientError::Storage(format!("Failed to persist notifications: {e}")))?;
        Ok(())
    }
}

/// Key/value store held in memory, for embedding and tests. Clones of the
/// serialized value survive a "reload" as long as the store itself does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(STORAGE_KEY)
            .cloned()
    }
}

impl NotificationStore for MemoryStore {
    fn load(&self) -> Result<Vec<Notification>, ClientError> {
        match self.raw() {
            Some(raw) => serde_json::from_str(&raw).map_err(corrupt),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, notifications: &[Notification]) -> Result<(), ClientError> {
        let raw = serde_json::to_string(notifications).map_err(corrupt)?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(STORAGE_KEY.to_string(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Severity;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notifications.json");

        let mut n = Notification::new(Severity::Success, "Uploaded", "cv.pdf");
        n.read = true;
        JsonFileStore::new(&path).save(&[n.clone()]).unwrap();

        let loaded = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(loaded, vec![n]);
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(&path).load().is_err());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        let n = Notification::new(Severity::Info, "a", "b");
        store.save(&[n.clone()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![n]);
        assert!(store.raw().is_some());
    }
}
