use crate::chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A puzzle as loaded from the catalog. Immutable for the duration of a
/// request; progress is tracked separately per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome class of a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessStatus {
    Correct,
    Wrong,
    Repeat,
    Invalid,
    Finished,
}

/// Why a guess got its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessReason {
    Hit,
    Miss,
    AlreadyGuessed,
    NotSingleChar,
    NotGuessable,
    Completed,
}

/// Full visible state of one game, safe to hand to any UI or suggester.
/// Masked text reveals everything once the puzzle is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub puzzle_id: String,
    pub title_masked: String,
    pub body_masked: String,
    pub guessed_correct: Vec<char>,
    pub guessed_wrong: Vec<char>,
    pub guess_count: u32,
    pub title_total: usize,
    pub title_remaining: usize,
    pub is_complete: bool,
    pub placeholder: char,
}

/// A guess result together with the post-mutation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    pub status: GuessStatus,
    pub reason: GuessReason,
    pub state: StateSnapshot,
}

/// The persistable subset of a game: counts and ordered guess lists, no
/// puzzle content. Title and body are re-supplied from the catalog on
/// restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameProgress {
    pub guess_count: u32,
    pub guessed_correct: Vec<char>,
    pub guessed_wrong: Vec<char>,
}

impl GameProgress {
    /// Sanitizing reader for persisted progress. Malformed input degrades
    /// instead of failing: list entries that are not single guessable
    /// characters are dropped, and a missing, non-integer, or negative
    /// count becomes 0.
    pub fn from_value(value: &Value) -> Self {
        fn char_list(value: Option<&Value>) -> Vec<char> {
            value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(chars::only_char)
                        .filter(|ch| chars::is_guessable(*ch))
                        .collect()
                })
                .unwrap_or_default()
        }

        let guess_count = value
            .get("guess_count")
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .clamp(0, u32::MAX as i64) as u32;

        Self {
            guess_count,
            guessed_correct: char_list(value.get("guessed_correct")),
            guessed_wrong: char_list(value.get("guessed_wrong")),
        }
    }
}

/// Progress status of a puzzle for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// One row of the per-player puzzle listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleListing {
    pub id: String,
    /// 1-based position in the catalog.
    pub index: usize,
    pub status: PuzzleStatus,
    pub guess_count: u32,
    pub is_complete: bool,
    pub is_current: bool,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Result of revealing a hint. `revealed` is `None` once the puzzle is
/// already complete. The `free` flag passes through untouched; penalty
/// accounting is the caller's concern, the engine treats both the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintOutcome {
    pub revealed: Option<char>,
    pub free: bool,
    pub state: StateSnapshot,
}
