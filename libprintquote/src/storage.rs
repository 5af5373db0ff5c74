//! Key-value storage abstraction for client-side state
//!
//! PrintQuote keeps a handful of small string values between runs: the
//! preferred display currency, the backend auth token and the cached user.
//! Callers depend on the `KeyValueStore` trait so the backing medium can be
//! swapped:
//! - `FileStore`: a JSON object on disk (default for the CLI tools)
//! - `MemoryStore`: process-local map (tests, one-shot sessions)

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StorageError;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Trait for string key-value storage backends
///
/// Every operation is fallible. Callers that must never fail (such as the
/// currency preference) catch errors at their own boundary.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key has never been written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value
    ///
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Get the backend name for logging and diagnostics
    fn backend_name(&self) -> &str;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.read().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// File-backed store holding every key in one JSON object
///
/// The whole file is read on each `get` and rewritten on each mutation, which
/// is fine for the few small values PrintQuote keeps. Writes go to a
/// temporary sibling first and are renamed into place.
///
/// # Example
///
/// ```no_run
/// use libprintquote::storage::{FileStore, KeyValueStore};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileStore::new("~/.local/share/printquote/preferences.json");
/// store.set("preferredCurrency", "EUR")?;
/// assert_eq!(store.get("preferredCurrency")?.as_deref(), Some("EUR"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FileStore {
    /// Create a store at `path`, expanding `~`
    ///
    /// The file is not touched until the first write.
    pub fn new(path: impl AsRef<str>) -> Self {
        let expanded = shellexpand::tilde(path.as_ref()).to_string();
        Self::from_path(PathBuf::from(expanded))
    }

    pub fn from_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Path a corrupt file is moved to before it is replaced
    pub fn corrupt_backup_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Load for a read-modify-write cycle
    ///
    /// A corrupt file is moved aside and replaced by an empty map, so one bad
    /// write never locks the store for good.
    fn load_for_write(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.load() {
            Err(StorageError::Corrupt(reason)) => {
                let backup = self.corrupt_backup_path();
                tracing::warn!(
                    "Storage file is corrupt ({}), moving it to {} and starting fresh",
                    reason,
                    backup.display()
                );
                std::fs::rename(&self.path, &backup)?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::debug!("Wrote {} key(s) to {}", values.len(), self.path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.read().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.write().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.write().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.load_for_write()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&values)
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("auth_token", "abc").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));

        store.set("auth_token", "def").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("def"));

        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);

        // Removing again is fine
        store.remove("auth_token").unwrap();
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::from_path(temp_dir.path().join("prefs.json"));

        assert_eq!(store.get("preferredCurrency").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("prefs.json");

        let store = FileStore::from_path(path.clone());
        store.set("preferredCurrency", "GBP").unwrap();
        store.set("auth_token", "t0k3n").unwrap();

        let reopened = FileStore::from_path(path);
        assert_eq!(reopened.get("preferredCurrency").unwrap().as_deref(), Some("GBP"));
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("t0k3n"));

        reopened.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
        assert_eq!(store.get("preferredCurrency").unwrap().as_deref(), Some("GBP"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::from_path(path);
        match store.get("preferredCurrency") {
            Err(StorageError::Corrupt(msg)) => assert!(msg.contains("prefs.json")),
            other => panic!("Expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_file_store_write_recovers_from_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let store = FileStore::from_path(path.clone());
        store.set("preferredCurrency", "EUR").unwrap();

        assert_eq!(store.get("preferredCurrency").unwrap().as_deref(), Some("EUR"));
        let backup = store.corrupt_backup_path();
        assert_eq!(backup, temp_dir.path().join("prefs.json.corrupt"));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ truncated");
    }

    #[test]
    fn test_file_store_remove_recovers_from_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = FileStore::from_path(path);
        store.remove("auth_token").unwrap();
        assert_eq!(store.get("auth_token").unwrap(), None);
        assert!(store.corrupt_backup_path().exists());
    }

    #[test]
    fn test_file_store_unreadable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be
        let store = FileStore::from_path(temp_dir.path().to_path_buf());

        assert!(matches!(store.get("k"), Err(StorageError::Io(_))));
        assert!(matches!(store.set("k", "v"), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_file_store_empty_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "  \n").unwrap();

        let store = FileStore::from_path(path);
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        let store = FileStore::from_path(path.clone());
        store.set("auth_token", "secret").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(MemoryStore::new().backend_name(), "memory");
        assert_eq!(FileStore::new("/tmp/x.json").backend_name(), "file");
    }
}
