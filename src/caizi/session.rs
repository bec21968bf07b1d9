//! All players' stores, backed by one durable JSON document.
//!
//! The manager is an explicit service: constructed by the host's startup
//! routine with an injected storage path and handed to request handlers,
//! not a module-level singleton. It assumes the host serializes mutating
//! access per player (`&mut self` enforces it in-process); the snapshot
//! document is replaced atomically so a crash mid-write can never corrupt
//! the previous state.

use crate::error::Result;
use crate::model::Puzzle;
use crate::store::{GameStore, StoreSnapshot};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct SessionDocument {
    users: BTreeMap<String, StoreSnapshot>,
}

pub struct SessionManager {
    storage_path: PathBuf,
    placeholder: char,
    stores: HashMap<String, GameStore>,
}

impl SessionManager {
    /// A manager with no stores; call [`SessionManager::load_from_disk`]
    /// to pick up an existing snapshot.
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            placeholder: crate::engine::DEFAULT_PLACEHOLDER,
            stores: HashMap::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn empty_store(&self) -> GameStore {
        GameStore::default().with_placeholder(self.placeholder)
    }

    /// Read the snapshot document, permissively. A missing, empty, or
    /// corrupt document leaves the manager empty; startup never fails on
    /// bad persisted data.
    ///
    /// Two document shapes are understood: the current
    /// `{"users": {player_id: snapshot}}` and the legacy
    /// `{"sessions": {session_id: snapshot}}`, whose keys are mapped to
    /// players through `resolve_session`. Legacy entries with no
    /// resolvable player are dropped; the first entry resolving to a
    /// player wins.
    pub fn load_from_disk(
        &mut self,
        puzzles_by_id: &HashMap<String, Puzzle>,
        resolve_session: impl Fn(&str) -> Option<String>,
    ) {
        let Ok(raw) = fs::read_to_string(&self.storage_path) else {
            return;
        };
        let Ok(data) = serde_json::from_str::<Value>(&raw) else {
            return;
        };

        if let Some(users) = data.get("users").and_then(Value::as_object) {
            if !users.is_empty() {
                for (player_id, value) in users {
                    let mut store = self.empty_store();
                    store.restore_from_snapshot(&StoreSnapshot::from_value(value), puzzles_by_id);
                    self.stores.insert(player_id.clone(), store);
                }
                return;
            }
        }

        if let Some(sessions) = data.get("sessions").and_then(Value::as_object) {
            for (session_id, value) in sessions {
                let Some(player_id) = resolve_session(session_id) else {
                    continue;
                };
                if self.stores.contains_key(&player_id) {
                    continue;
                }
                let mut store = self.empty_store();
                store.restore_from_snapshot(&StoreSnapshot::from_value(value), puzzles_by_id);
                self.stores.insert(player_id, store);
            }
        }
    }

    /// Write every store to the snapshot document. The document is written
    /// to a temporary sibling and renamed over the target so a crash or
    /// power loss mid-write leaves the old snapshot intact.
    pub fn save(&self) -> Result<()> {
        let document = SessionDocument {
            users: self
                .stores
                .iter()
                .map(|(player_id, store)| (player_id.clone(), store.export_snapshot()))
                .collect(),
        };
        let content = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.storage_path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.storage_path)?;
        Ok(())
    }

    pub fn store(&self, player_id: &str) -> Option<&GameStore> {
        self.stores.get(player_id)
    }

    pub fn get_or_create_store(&mut self, player_id: &str) -> &mut GameStore {
        let placeholder = self.placeholder;
        self.stores
            .entry(player_id.to_string())
            .or_insert_with(|| GameStore::default().with_placeholder(placeholder))
    }

    pub fn player_count(&self) -> usize {
        self.stores.len()
    }

    /// Drop a puzzle from every player's store, called when its file is
    /// deleted or overwritten, so stale progress never outlives the
    /// puzzle definition. Persists immediately iff anything changed.
    pub fn remove_puzzle(&mut self, puzzle_id: &str) -> Result<()> {
        let mut changed = false;
        for store in self.stores.values_mut() {
            changed |= store.drop_puzzle(puzzle_id);
        }
        if changed {
            self.save()?;
        }
        Ok(())
    }
}
