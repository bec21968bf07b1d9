//! Daily puzzle rotation.
//!
//! One puzzle per calendar day, chosen deterministically from the eligible
//! pool, never repeating while an eligible alternative remains. The
//! selection for a date is committed to history and cached, so repeated
//! calls within a day are stable even across restarts.

use crate::error::{CaiziError, Result};
use crate::model::Puzzle;
use crate::settings::{DailyCurator, SettingsStore};
use chrono::Utc;
use rustc_hash::FxHasher;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

pub const DAILY_DATE_KEY: &str = "daily_puzzle_date";
pub const DAILY_ID_KEY: &str = "daily_puzzle_id";
pub const DAILY_HISTORY_KEY: &str = "daily_puzzle_history";
pub const DAILY_AUTO_UNPLAYED_KEY: &str = "daily_auto_unplayed";

/// The committed choice for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySelection {
    pub date: String,
    pub puzzle_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct HistoryEntry {
    date: String,
    puzzle_id: String,
}

/// Local calendar date as `YYYY-MM-DD`, at a fixed offset from UTC.
pub fn local_date_string(utc_offset_hours: i64) -> String {
    (Utc::now() + chrono::Duration::hours(utc_offset_hours.clamp(-24, 24)))
        .format("%Y-%m-%d")
        .to_string()
}

// FxHasher has no random state, so the same date always yields the same
// seed across runs and platforms.
fn date_seed(date: &str) -> u64 {
    let mut hasher = FxHasher::default();
    date.hash(&mut hasher);
    hasher.finish()
}

fn load_history<S: SettingsStore>(settings: &S) -> Vec<HistoryEntry> {
    let raw = settings.get(DAILY_HISTORY_KEY).unwrap_or_default();
    let Ok(data) = serde_json::from_str::<Value>(&raw) else {
        return Vec::new();
    };
    let Some(items) = data.as_array() else {
        return Vec::new();
    };
    let mut history = Vec::new();
    for item in items {
        match item {
            Value::Object(entry) => {
                let puzzle_id = entry
                    .get("puzzle_id")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_string();
                let date = entry
                    .get("date")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_string();
                if !puzzle_id.is_empty() {
                    history.push(HistoryEntry { date, puzzle_id });
                }
            }
            // Early documents stored bare ids with no date
            Value::String(puzzle_id) => {
                let puzzle_id = puzzle_id.trim().to_string();
                if !puzzle_id.is_empty() {
                    history.push(HistoryEntry {
                        date: String::new(),
                        puzzle_id,
                    });
                }
            }
            _ => {}
        }
    }
    history
}

fn save_history<S: SettingsStore>(settings: &mut S, history: &[HistoryEntry]) -> Result<()> {
    settings.set(DAILY_HISTORY_KEY, &serde_json::to_string(history)?);
    Ok(())
}

/// The ids eligible for daily selection, in catalog order: the
/// curator-flagged candidates, or the whole catalog when nothing is
/// flagged; widened with never-played puzzles when the auto-unplayed
/// policy flag is on.
fn eligible_pool<S>(puzzles: &[Puzzle], store: &S) -> Vec<String>
where
    S: SettingsStore + DailyCurator,
{
    let flagged: HashSet<String> = store.daily_ids().into_iter().collect();
    let mut pool: HashSet<String> = if flagged.is_empty() {
        puzzles.iter().map(|puzzle| puzzle.id.clone()).collect()
    } else {
        flagged
    };

    if store.get(DAILY_AUTO_UNPLAYED_KEY).as_deref() == Some("1") {
        let played: HashSet<String> = store.played_ids().into_iter().collect();
        for puzzle in puzzles {
            if !played.contains(&puzzle.id) {
                pool.insert(puzzle.id.clone());
            }
        }
    }

    puzzles
        .iter()
        .filter(|puzzle| pool.contains(&puzzle.id))
        .map(|puzzle| puzzle.id.clone())
        .collect()
}

/// Pick (or recall) the daily puzzle for `date`.
///
/// A cached selection for the same date is reused as long as the puzzle
/// still exists. Otherwise the date's seed indexes into the unused part of
/// the eligible pool; the choice is appended to history (replacing any
/// entry for that date), the chosen puzzle loses its daily-candidate flag
/// ("spent"), and the cache is updated. Fails with `DailyPoolExhausted`
/// when every eligible puzzle has already had its day.
pub fn pick_daily_puzzle<S>(puzzles: &[Puzzle], store: &mut S, date: &str) -> Result<DailySelection>
where
    S: SettingsStore + DailyCurator,
{
    let known: HashSet<&str> = puzzles.iter().map(|puzzle| puzzle.id.as_str()).collect();

    if store.get(DAILY_DATE_KEY).as_deref() == Some(date) {
        if let Some(cached) = store.get(DAILY_ID_KEY) {
            if !cached.is_empty() && known.contains(cached.as_str()) {
                return Ok(DailySelection {
                    date: date.to_string(),
                    puzzle_id: cached,
                });
            }
        }
    }

    let pool = eligible_pool(puzzles, store);
    let mut history = load_history(store);
    let used: HashSet<&str> = history
        .iter()
        .map(|entry| entry.puzzle_id.as_str())
        .collect();
    let unused: Vec<&String> = pool.iter().filter(|id| !used.contains(id.as_str())).collect();
    if unused.is_empty() {
        return Err(CaiziError::DailyPoolExhausted);
    }

    let puzzle_id = unused[(date_seed(date) % unused.len() as u64) as usize].clone();

    history.retain(|entry| entry.date != date);
    history.push(HistoryEntry {
        date: date.to_string(),
        puzzle_id: puzzle_id.clone(),
    });
    save_history(store, &history)?;

    if store.daily_ids().iter().any(|id| id == &puzzle_id) {
        store.set_daily_flag(&puzzle_id, false);
    }
    store.set(DAILY_DATE_KEY, date);
    store.set(DAILY_ID_KEY, &puzzle_id);

    Ok(DailySelection {
        date: date.to_string(),
        puzzle_id,
    })
}
