use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("invalid slot name '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store unavailable")]
    Unavailable,
}

/// A local string key-value store. Each key names one slot holding text.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` if the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    /// Overwrite a slot.
    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }
}

fn validate_key(key: &str) -> Result<(), KvError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(KvError::InvalidKey(key.to_string()))
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Directory-backed store
// ---------------------------------------------------------------------------

/// Stores each slot as `<dir>/<key>.json`. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKvStore { dir: dir.into() }
    }

    /// File path for a slot
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KvError::ReadError { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        validate_key(key)?;
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|e| KvError::WriteError {
            path: self.dir.clone(),
            source: e,
        })?;
        atomic_write(&path, value.as_bytes()).map_err(|e| KvError::WriteError { path, source: e })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store backing the in-process tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one slot pre-populated
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every later `set` fail with `KvError::Unavailable`
    #[cfg(test)]
    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(KvError::Unavailable);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slot.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileKvStore::new(tmp.path().join("data"));
        assert_eq!(store.get("todos").unwrap(), None);

        store.set("todos", "[]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
        assert!(tmp.path().join("data/todos.json").exists());

        store.set("todos", "[1]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileKvStore::new(tmp.path());
        assert!(matches!(store.get("../etc"), Err(KvError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(KvError::InvalidKey(_))));
        assert!(store.get("work-list_2").is_ok());
    }

    #[test]
    fn memory_store_failing_writes() {
        let mut store = MemoryKvStore::with_entry("todos", "[]").failing_writes();
        assert!(matches!(store.set("todos", "x"), Err(KvError::Unavailable)));
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
    }
}
