use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    constants::STORE_KEYS,
    domain::{Preset, TimeBlock, Todo},
    error::StorageError,
    presets::PresetBook,
    schedule::Schedule,
    todos::TodoList,
};

const MAX_BACKUPS_PER_KEY: usize = 10;

/// String values under string keys. Each key holds one JSON document.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        atomic_write(&self.path_for(key), value)
    }
}

pub fn load_schedule(store: &impl KeyValueStore) -> Schedule {
    let restored = read_key::<Vec<TimeBlock>>(store, STORE_KEYS.schedule)
        .and_then(|blocks| match blocks {
            Some(blocks) => Ok(Some(Schedule::restore(blocks)?)),
            None => Ok(None),
        });
    fallback_on_error(STORE_KEYS.schedule, restored)
}

pub fn load_todos(store: &impl KeyValueStore) -> TodoList {
    let restored =
        read_key::<Vec<Todo>>(store, STORE_KEYS.todos).map(|items| items.map(TodoList::from_items));
    fallback_on_error(STORE_KEYS.todos, restored)
}

pub fn load_presets(store: &impl KeyValueStore) -> PresetBook {
    let restored =
        read_key::<Vec<Preset>>(store, STORE_KEYS.presets).map(|items| items.map(PresetBook::restore));
    fallback_on_error(STORE_KEYS.presets, restored)
}

pub fn save_schedule(
    store: &mut impl KeyValueStore,
    schedule: &Schedule,
) -> Result<(), StorageError> {
    write_key(store, STORE_KEYS.schedule, schedule)
}

pub fn save_todos(store: &mut impl KeyValueStore, todos: &TodoList) -> Result<(), StorageError> {
    write_key(store, STORE_KEYS.todos, todos)
}

pub fn save_presets(
    store: &mut impl KeyValueStore,
    presets: &PresetBook,
) -> Result<(), StorageError> {
    write_key(store, STORE_KEYS.presets, presets)
}

fn read_key<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn write_key<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}

fn fallback_on_error<T: Default>(key: &str, loaded: Result<Option<T>, StorageError>) -> T {
    match loaded {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!("could not load '{}', using defaults: {}", key, e);
            T::default()
        }
    }
}

pub fn schedule_to_csv(blocks: &[TimeBlock]) -> Result<String, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for block in blocks {
        writer.serialize(block)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Invalid(e.to_string()))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "daypie", "daypie")
}

/// A `schedule.json` in the working directory wins, so a planner can live
/// next to a project. Otherwise the configured or platform data directory.
pub fn get_data_dir(configured: Option<&Path>) -> PathBuf {
    let local_schedule = Path::new("./schedule.json");
    if local_schedule.exists() {
        return PathBuf::from(".");
    }

    if let Some(dir) = configured {
        return dir.to_path_buf();
    }

    if let Some(proj_dirs) = project_dirs() {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
        let dir = proj_dirs.cache_dir().to_path_buf();
        fs::create_dir_all(&dir).ok();
        return dir;
    }
    PathBuf::from(".")
}

pub fn get_config_path() -> Option<PathBuf> {
    project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), StorageError> {
    atomic_write(path, content)
}

pub fn create_backup(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        return Ok(());
    }

    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let backup_path = backup_dir.join(format!("{}.{}", file_name, timestamp));
    fs::copy(path, &backup_path)?;

    let prefix = format!("{}.", file_name);
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .collect();
        backups.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        while backups.len() > MAX_BACKUPS_PER_KEY {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest.path());
        }
    }

    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    if path.exists() {
        create_backup(path)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;

    use super::KeyValueStore;
    use crate::error::StorageError;

    /// In-memory store that records every write and can be told to fail them.
    #[derive(Default)]
    pub struct MemoryStore {
        pub values: HashMap<String, String>,
        pub writes: Vec<String>,
        pub fail_writes: bool,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Invalid("write refused".to_string()));
            }
            self.writes.push(key.to_string());
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use super::{memory::MemoryStore, *};
    use crate::domain::{BlockId, TodoId};

    fn unique_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}", prefix, now))
    }

    #[test]
    fn test_missing_keys_load_defaults() {
        let store = MemoryStore::default();
        assert_eq!(load_schedule(&store), Schedule::default());
        assert!(load_todos(&store).is_empty());
        assert_eq!(load_presets(&store), PresetBook::default());
    }

    #[test]
    fn test_corrupt_json_falls_back_to_defaults() {
        let mut store = MemoryStore::default();
        store
            .values
            .insert("schedule".to_string(), "{not json".to_string());
        store.values.insert("todos".to_string(), "42".to_string());

        assert_eq!(load_schedule(&store), Schedule::default());
        assert!(load_todos(&store).is_empty());
    }

    #[test]
    fn test_invalid_schedule_falls_back_to_default() {
        let mut store = MemoryStore::default();
        store.values.insert("schedule".to_string(), "[]".to_string());
        assert_eq!(load_schedule(&store), Schedule::default());
    }

    #[test]
    fn test_schedule_with_duplicate_ids_falls_back_to_default() {
        let mut store = MemoryStore::default();
        let blocks = vec![
            TimeBlock::new("a", "Morning", 0.0, 12.0, "#1f77b4"),
            TimeBlock::new("a", "Evening", 12.0, 24.0, "#ff7f0e"),
        ];
        store.values.insert(
            "schedule".to_string(),
            serde_json::to_string(&blocks).unwrap(),
        );
        assert_eq!(load_schedule(&store), Schedule::default());
    }

    #[test]
    fn test_stores_round_trip_through_memory() {
        let mut store = MemoryStore::default();
        let schedule = Schedule::default().split_block(&BlockId::new("1"), &Default::default());
        let todos = TodoList::default().add("stretch").add("read");
        let todos = todos.toggle(&todos.items()[0].id.clone());
        let presets = PresetBook::default().save("Split", &schedule);

        save_schedule(&mut store, &schedule).unwrap();
        save_todos(&mut store, &todos).unwrap();
        save_presets(&mut store, &presets).unwrap();

        assert_eq!(load_schedule(&store), schedule);
        assert_eq!(load_todos(&store), todos);
        assert_eq!(load_presets(&store), presets);
        assert_eq!(store.writes, vec!["schedule", "todos", "presets"]);
    }

    #[test]
    fn test_persisted_layout_is_plain_arrays() {
        let mut store = MemoryStore::default();
        let todos = TodoList::from_items(vec![Todo {
            id: TodoId::new("t1"),
            text: "call".to_string(),
            completed: false,
        }]);
        save_todos(&mut store, &todos).unwrap();

        let value: serde_json::Value = serde_json::from_str(&store.values["todos"]).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "id": "t1", "text": "call", "completed": false }])
        );
    }

    #[test]
    fn test_file_store_round_trip_with_backup() {
        let dir = unique_dir("daypie_file_store");
        let mut store = FileStore::new(dir.clone());

        assert_eq!(store.get("todos").unwrap(), None);
        store.set("todos", "[]").unwrap();
        store.set("todos", "[1]").unwrap();

        assert_eq!(store.get("todos").unwrap(), Some("[1]".to_string()));
        assert!(!dir.join("todos.tmp").exists());
        let backups = fs::read_dir(dir.join("backups")).unwrap().count();
        assert_eq!(backups, 1);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_schedule_csv_has_header_and_rows() {
        let csv = schedule_to_csv(Schedule::default().blocks()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,name,start,end,color"));
        assert_eq!(lines.next(), Some("1,Sleep,0.0,7.0,#1f77b4"));
        assert_eq!(csv.lines().count(), 9);
    }
}
