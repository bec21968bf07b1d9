//! Key/value settings and daily-pool curation.
//!
//! Both concerns are collaborator traits so the core stays independent of
//! where they persist: [`JsonSettings`] keeps everything in one JSON file
//! for the CLI, [`MemSettings`] is the in-memory twin for tests. A host
//! with a relational store can implement the traits over its own tables.

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Flat string key/value storage.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Curation of the daily-puzzle pool: which puzzles are flagged as daily
/// candidates and which have ever been played.
pub trait DailyCurator {
    fn daily_ids(&self) -> Vec<String>;
    fn set_daily_flag(&mut self, puzzle_id: &str, flagged: bool);
    fn played_ids(&self) -> Vec<String>;
    fn mark_played(&mut self, puzzle_id: &str);
}

const DAILY_FLAGS_KEY: &str = "daily_flags";
const PLAYED_IDS_KEY: &str = "played_puzzle_ids";

fn read_ids<S: SettingsStore + ?Sized>(store: &S, key: &str) -> Vec<String> {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
        .unwrap_or_default()
}

fn write_ids<S: SettingsStore + ?Sized>(store: &mut S, key: &str, ids: Vec<String>) {
    store.set(key, &Value::from(ids).to_string());
}

fn set_membership<S: SettingsStore + ?Sized>(store: &mut S, key: &str, id: &str, present: bool) {
    let mut ids = read_ids(store, key);
    let already = ids.iter().any(|existing| existing == id);
    match (present, already) {
        (true, false) => ids.push(id.to_string()),
        (false, true) => ids.retain(|existing| existing != id),
        _ => return,
    }
    write_ids(store, key, ids);
}

/// File-backed settings. Loads permissively (missing or corrupt file means
/// no settings) and rewrites the whole document atomically on
/// [`JsonSettings::save`]. Mutations are in-memory until saved.
pub struct JsonSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonSettings {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, String>>(&raw).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl DailyCurator for JsonSettings {
    fn daily_ids(&self) -> Vec<String> {
        read_ids(self, DAILY_FLAGS_KEY)
    }

    fn set_daily_flag(&mut self, puzzle_id: &str, flagged: bool) {
        set_membership(self, DAILY_FLAGS_KEY, puzzle_id, flagged);
    }

    fn played_ids(&self) -> Vec<String> {
        read_ids(self, PLAYED_IDS_KEY)
    }

    fn mark_played(&mut self, puzzle_id: &str) {
        set_membership(self, PLAYED_IDS_KEY, puzzle_id, true);
    }
}

/// In-memory settings for tests.
#[derive(Debug, Clone, Default)]
pub struct MemSettings {
    values: BTreeMap<String, String>,
}

impl MemSettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl DailyCurator for MemSettings {
    fn daily_ids(&self) -> Vec<String> {
        read_ids(self, DAILY_FLAGS_KEY)
    }

    fn set_daily_flag(&mut self, puzzle_id: &str, flagged: bool) {
        set_membership(self, DAILY_FLAGS_KEY, puzzle_id, flagged);
    }

    fn played_ids(&self) -> Vec<String> {
        read_ids(self, PLAYED_IDS_KEY)
    }

    fn mark_played(&mut self, puzzle_id: &str) {
        set_membership(self, PLAYED_IDS_KEY, puzzle_id, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mem_settings_basic_ops() {
        let mut settings = MemSettings::new();
        assert_eq!(settings.get("k"), None);
        settings.set("k", "v");
        assert_eq!(settings.get("k"), Some("v".to_string()));
        settings.remove("k");
        assert_eq!(settings.get("k"), None);
    }

    #[test]
    fn curator_flags_and_played() {
        let mut settings = MemSettings::new();
        settings.set_daily_flag("a", true);
        settings.set_daily_flag("b", true);
        settings.set_daily_flag("a", true); // idempotent
        assert_eq!(settings.daily_ids(), vec!["a", "b"]);

        settings.set_daily_flag("a", false);
        assert_eq!(settings.daily_ids(), vec!["b"]);

        settings.mark_played("a");
        settings.mark_played("a");
        assert_eq!(settings.played_ids(), vec!["a"]);
    }

    #[test]
    fn json_settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("settings.json");

        let mut settings = JsonSettings::load(&path);
        settings.set("daily_puzzle_date", "2026-08-06");
        settings.set_daily_flag("bj", true);
        settings.save().unwrap();

        let reloaded = JsonSettings::load(&path);
        assert_eq!(
            reloaded.get("daily_puzzle_date"),
            Some("2026-08-06".to_string())
        );
        assert_eq!(reloaded.daily_ids(), vec!["bj"]);
    }

    #[test]
    fn json_settings_tolerates_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "][").unwrap();
        let settings = JsonSettings::load(&path);
        assert_eq!(settings.get("anything"), None);
    }

    #[test]
    fn json_settings_save_is_atomic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = JsonSettings::load(&path);
        settings.set("k", "v");
        settings.save().unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }
}
