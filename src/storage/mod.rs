// Local key-value storage backed by sled, standing in for browser local storage.
// Values are bincode-encoded; each concern gets its own tree.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const SESSION_TREE: &str = "session";
pub const ALUNO_CACHE_TREE: &str = "aluno_ids";

/// Storage manager for the local embedded database
#[derive(Clone)]
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Database directory (~/.zapnutri/storage, or $ZAPNUTRI_STORAGE_PATH)
    pub fn db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("ZAPNUTRI_STORAGE_PATH") {
            return Ok(PathBuf::from(path));
        }

        Ok(crate::config::Config::config_dir()?.join("storage"))
    }

    /// Open the default database
    pub fn init() -> Result<Self> {
        Self::open(&Self::db_path()?)
    }

    /// Open a database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening sled database at {:?}", path);
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// In-memory database, discarded on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn get<T: DeserializeOwned>(&self, tree: &str, key: &str) -> Result<Option<T>> {
        let tree = self.db.open_tree(tree)?;

        match tree.get(key.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, tree: &str, key: &str, value: &T) -> Result<()> {
        let tree = self.db.open_tree(tree)?;
        let value = bincode::serialize(value)?;

        tree.insert(key.as_bytes(), value)?;
        self.db.flush()?;

        tracing::debug!("Stored {}", key);
        Ok(())
    }

    /// Remove a key, returning whether it existed
    pub fn remove(&self, tree: &str, key: &str) -> Result<bool> {
        let tree = self.db.open_tree(tree)?;
        let removed = tree.remove(key.as_bytes())?.is_some();

        if removed {
            self.db.flush()?;
            tracing::debug!("Removed {}", key);
        }

        Ok(removed)
    }

    /// Remove every key starting with `prefix`, returning how many went
    pub fn remove_prefix(&self, tree: &str, prefix: &str) -> Result<usize> {
        let tree = self.db.open_tree(tree)?;

        let keys = tree
            .scan_prefix(prefix.as_bytes())
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for key in &keys {
            tree.remove(key)?;
        }

        if !keys.is_empty() {
            self.db.flush()?;
        }

        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() -> Result<()> {
        let storage = Storage::temporary()?;

        storage.set(ALUNO_CACHE_TREE, "proj:user", &"aluno-1".to_string())?;
        let value: Option<String> = storage.get(ALUNO_CACHE_TREE, "proj:user")?;
        assert_eq!(value.as_deref(), Some("aluno-1"));

        assert!(storage.remove(ALUNO_CACHE_TREE, "proj:user")?);
        assert!(!storage.remove(ALUNO_CACHE_TREE, "proj:user")?);

        let value: Option<String> = storage.get(ALUNO_CACHE_TREE, "proj:user")?;
        assert!(value.is_none());
        Ok(())
    }

    #[test]
    fn test_remove_prefix_only_touches_matching_keys() -> Result<()> {
        let storage = Storage::temporary()?;

        storage.set(ALUNO_CACHE_TREE, "proj-a:u1", &"1".to_string())?;
        storage.set(ALUNO_CACHE_TREE, "proj-a:u2", &"2".to_string())?;
        storage.set(ALUNO_CACHE_TREE, "proj-b:u1", &"3".to_string())?;

        assert_eq!(storage.remove_prefix(ALUNO_CACHE_TREE, "proj-a:")?, 2);

        let kept: Option<String> = storage.get(ALUNO_CACHE_TREE, "proj-b:u1")?;
        assert_eq!(kept.as_deref(), Some("3"));
        Ok(())
    }

    #[test]
    fn test_persistence_across_instances() -> Result<()> {
        let dir = tempdir().map_err(|e| crate::error::ZapError::Config(e.to_string()))?;
        let path = dir.path().join("db");

        {
            let storage = Storage::open(&path)?;
            storage.set(SESSION_TREE, "key", &42u32)?;
        }

        let storage = Storage::open(&path)?;
        let value: Option<u32> = storage.get(SESSION_TREE, "key")?;
        assert_eq!(value, Some(42));
        Ok(())
    }
}
