use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::models::Db;

// Keys, one JSON blob each.
pub const TASKS_KEY: &str = "tasks";
pub const BLOCKS_KEY: &str = "blocks";
pub const STATS_KEY: &str = "dailyStats";
pub const LAST_VISIT_KEY: &str = "lastVisit";

// Synchronous key/value persistence. A missing key loads as `None`.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    // Write to a temp file, then rename over the target.
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path(key);
        let tmp_path = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(value)?;

        fs::create_dir_all(&self.root)?;
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}

fn load_key<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> Result<T, StoreError> {
    match store.load(key)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

fn save_key<T: Serialize>(store: &dyn KeyValueStore, key: &str, data: &T) -> Result<(), StoreError> {
    store.save(key, &serde_json::to_value(data)?)
}

pub fn load_db(store: &dyn KeyValueStore) -> Result<Db, StoreError> {
    Ok(Db {
        tasks: load_key(store, TASKS_KEY)?,
        blocks: load_key(store, BLOCKS_KEY)?,
        daily_stats: load_key(store, STATS_KEY)?,
        last_visit: load_key(store, LAST_VISIT_KEY)?,
    })
}

pub fn save_db(store: &dyn KeyValueStore, db: &Db) -> Result<(), StoreError> {
    save_key(store, TASKS_KEY, &db.tasks)?;
    save_key(store, BLOCKS_KEY, &db.blocks)?;
    save_key(store, STATS_KEY, &db.daily_stats)?;
    save_key(store, LAST_VISIT_KEY, &db.last_visit)?;
    Ok(())
}
