//! Disk-backed credential store.
//!
//! Stands in for the browser-local storage slot of the original widget: one
//! raw secret per backend under a fixed namespaced key, surviving restarts.
//! Writes are atomic (temp file + rename) so a crash mid-write never leaves
//! a truncated credential file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::credentials::CredentialStore;
use crate::error::{QueryError, Result};

/// JSON map of backend id -> secret at a fixed path.
///
/// Reads go to disk on every call so concurrent widgets in the same process
/// observe each other's updates, mirroring how page widgets share one
/// browser storage slot.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Default location: `~/.askbox/credentials.json`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(".askbox").join("credentials.json")
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| QueryError::Store(format!("invalid credential file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(QueryError::Store(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, slots: &HashMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(slots)
            .map_err(|e| QueryError::Store(format!("failed to serialize credentials: {e}")))?;
        write_atomic(&self.path, &data)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, backend_id: &str) -> Option<String> {
        self.load().ok()?.remove(backend_id)
    }

    fn set(&self, backend_id: &str, secret: &str) -> Result<()> {
        let mut slots = self.load()?;
        slots.insert(backend_id.to_string(), secret.to_string());
        self.save(&slots)
    }

    fn clear(&self, backend_id: &str) -> Result<()> {
        let mut slots = self.load()?;
        if slots.remove(backend_id).is_some() {
            self.save(&slots)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            QueryError::Store(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)
        .map_err(|e| QueryError::Store(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path).map_err(|e| {
        QueryError::Store(format!(
            "failed to replace {} with {}: {e}",
            path.display(),
            tmp.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileCredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        (dir, store)
    }

    #[test]
    fn test_roundtrips_across_store_instances() {
        let (dir, store) = temp_store();
        store.set("gemini", "AIza-test").unwrap();

        // a second instance over the same path sees the secret
        let other = FileCredentialStore::new(dir.path().join("credentials.json"));
        assert_eq!(other.get("gemini").as_deref(), Some("AIza-test"));
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("gemini"), None);
        store.clear("gemini").unwrap();
    }

    #[test]
    fn test_clear_removes_only_the_named_backend() {
        let (_dir, store) = temp_store();
        store.set("gemini", "a").unwrap();
        store.set("openai", "b").unwrap();
        store.clear("gemini").unwrap();
        assert_eq!(store.get("gemini"), None);
        assert_eq!(store.get("openai").as_deref(), Some("b"));
    }

    #[test]
    fn test_corrupt_file_surfaces_store_error() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path.parent().unwrap()).unwrap();
        fs::write(&store.path, b"not json").unwrap();
        assert!(matches!(
            store.set("gemini", "x"),
            Err(QueryError::Store(_))
        ));
    }
}
