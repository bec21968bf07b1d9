//! Per-player game collection.
//!
//! A [`GameStore`] owns every game one player has started, tracks which
//! puzzle is active, and remembers each puzzle's last suggester attempt so
//! a rejected guess is not re-offered. Stores are created on first access
//! and live for as long as the player's snapshot does.

use crate::catalog;
use crate::chars;
use crate::engine::{Game, DEFAULT_PLACEHOLDER};
use crate::error::{CaiziError, Result};
use crate::model::{
    GameProgress, GuessResult, GuessStatus, HintOutcome, Puzzle, PuzzleListing, PuzzleStatus,
    StateSnapshot,
};
use crate::suggester::{Suggester, SuggesterAttempt, Suggestion};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

/// Suggestions rejected locally before one is played.
const MAX_SUGGESTER_ATTEMPTS: u32 = 3;

/// How to start a puzzle: `Resume` keeps any existing progress, `Restart`
/// discards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Resume,
    Restart,
}

impl FromStr for StartMode {
    type Err = CaiziError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "resume" => Ok(StartMode::Resume),
            "restart" => Ok(StartMode::Restart),
            other => Err(CaiziError::InvalidMode(other.to_string())),
        }
    }
}

/// Outcome of one suggester-driven step.
#[derive(Debug, Clone, PartialEq)]
pub enum AiStepOutcome {
    /// The puzzle was already complete; the suggester was not consulted.
    Done { state: StateSnapshot },
    /// A legal novel guess was played; hit or miss both end the step.
    Stepped {
        guess: char,
        reason: String,
        result: GuessResult,
    },
}

/// The persistable form of a store: the current puzzle plus per-puzzle
/// progress. Puzzle content is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    pub current_id: Option<String>,
    pub games: BTreeMap<String, GameProgress>,
}

impl StoreSnapshot {
    /// Permissive reader: anything that is not the expected shape simply
    /// contributes nothing.
    pub fn from_value(value: &Value) -> Self {
        let current_id = value
            .get("current_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let games = value
            .get("games")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, progress)| (id.clone(), GameProgress::from_value(progress)))
                    .collect()
            })
            .unwrap_or_default();
        Self { current_id, games }
    }
}

pub struct GameStore {
    games: HashMap<String, Game>,
    current_id: Option<String>,
    last_suggestion: HashMap<String, SuggesterAttempt>,
    placeholder: char,
}

impl Default for GameStore {
    fn default() -> Self {
        Self {
            games: HashMap::new(),
            current_id: None,
            last_suggestion: HashMap::new(),
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

impl GameStore {
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn has_game(&self, puzzle_id: &str) -> bool {
        self.games.contains_key(puzzle_id)
    }

    /// Start or resume a puzzle. Resume with existing progress switches to
    /// it unchanged: resume never resets. Anything else builds a fresh
    /// game, replacing old progress and clearing that puzzle's suggester
    /// memory.
    pub fn start(
        &mut self,
        puzzles: &[Puzzle],
        puzzle_id: Option<&str>,
        mode: StartMode,
    ) -> Result<StateSnapshot> {
        let puzzle = catalog::choose_puzzle(puzzles, puzzle_id)?;
        let id = puzzle.id.clone();

        if mode == StartMode::Resume {
            if let Some(game) = self.games.get(&id) {
                let state = game.get_state();
                self.current_id = Some(id);
                return Ok(state);
            }
        }

        let game =
            Game::new(&id, &puzzle.title, &puzzle.body).with_placeholder(self.placeholder);
        let state = game.get_state();
        self.games.insert(id.clone(), game);
        self.last_suggestion.remove(&id);
        self.current_id = Some(id);
        Ok(state)
    }

    /// Snapshot of the current game, if any.
    pub fn state(&self) -> Option<StateSnapshot> {
        let id = self.current_id.as_deref()?;
        self.games.get(id).map(Game::get_state)
    }

    fn current_game_mut(&mut self) -> Result<&mut Game> {
        let id = self.current_id.clone().ok_or(CaiziError::NoActiveGame)?;
        self.games.get_mut(&id).ok_or(CaiziError::NoActiveGame)
    }

    /// Forward a guess to the current game.
    pub fn guess(&mut self, input: &str) -> Result<GuessResult> {
        Ok(self.current_game_mut()?.guess(input))
    }

    /// Reveal one title character of the current game.
    pub fn use_hint(&mut self, free: bool) -> Result<HintOutcome> {
        Ok(self.current_game_mut()?.reveal_hint(free))
    }

    /// The catalog annotated with this player's progress.
    pub fn list_puzzles(&self, puzzles: &[Puzzle]) -> Vec<PuzzleListing> {
        puzzles
            .iter()
            .enumerate()
            .map(|(position, puzzle)| {
                let (status, guess_count, is_complete) = match self.games.get(&puzzle.id) {
                    None => (PuzzleStatus::NotStarted, 0, false),
                    Some(game) => {
                        let complete = game.is_complete();
                        let status = if complete {
                            PuzzleStatus::Completed
                        } else {
                            PuzzleStatus::InProgress
                        };
                        (status, game.guess_count(), complete)
                    }
                };
                PuzzleListing {
                    id: puzzle.id.clone(),
                    index: position + 1,
                    status,
                    guess_count,
                    is_complete,
                    is_current: self.current_id.as_deref() == Some(puzzle.id.as_str()),
                    title: puzzle.title.clone(),
                    created_at: puzzle.created_at,
                }
            })
            .collect()
    }

    /// Ask the suggester for the next guess and play it.
    ///
    /// Up to [`MAX_SUGGESTER_ATTEMPTS`] suggestions are screened locally:
    /// multi-character output and characters already guessed are rejected
    /// without touching the game, and the rejection is threaded back as the
    /// previous attempt for the next try. The first legal suggestion is
    /// played and ends the step whether it hits or misses.
    pub fn ai_step(&mut self, suggester: &mut dyn Suggester) -> Result<AiStepOutcome> {
        let current = self.current_id.clone().ok_or(CaiziError::NoActiveGame)?;
        let (state, forbidden) = {
            let game = self.games.get(&current).ok_or(CaiziError::NoActiveGame)?;
            let state = game.get_state();
            let forbidden: HashSet<char> = state
                .guessed_correct
                .iter()
                .chain(state.guessed_wrong.iter())
                .copied()
                .collect();
            (state, forbidden)
        };

        if state.is_complete {
            return Ok(AiStepOutcome::Done { state });
        }

        let mut previous = self.last_suggestion.get(&current).cloned();
        for _ in 0..MAX_SUGGESTER_ATTEMPTS {
            let Suggestion { guess, reason } = suggester.suggest_next(&state, previous.as_ref())?;
            let guess = guess.trim().to_string();

            // Screen locally; a rejection never reaches the game
            let ch = match chars::only_char(&guess) {
                Some(ch) if !forbidden.contains(&ch) => ch,
                Some(_) => {
                    previous = Some(SuggesterAttempt {
                        guess,
                        reason,
                        status: GuessStatus::Repeat,
                    });
                    continue;
                }
                None => {
                    previous = Some(SuggesterAttempt {
                        guess,
                        reason,
                        status: GuessStatus::Invalid,
                    });
                    continue;
                }
            };

            let result = self
                .games
                .get_mut(&current)
                .ok_or(CaiziError::NoActiveGame)?
                .guess(&guess);
            self.last_suggestion.insert(
                current.clone(),
                SuggesterAttempt {
                    guess,
                    reason: reason.clone(),
                    status: result.status,
                },
            );
            return Ok(AiStepOutcome::Stepped {
                guess: ch,
                reason,
                result,
            });
        }

        Err(CaiziError::SuggesterExhausted(MAX_SUGGESTER_ATTEMPTS))
    }

    /// Export this store for persistence.
    pub fn export_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            current_id: self.current_id.clone(),
            games: self
                .games
                .iter()
                .map(|(id, game)| (id.clone(), game.export_progress()))
                .collect(),
        }
    }

    /// Rebuild games from a snapshot. Entries whose puzzle is no longer in
    /// the catalog are silently skipped: the puzzle was deleted and its
    /// progress goes with it.
    pub fn restore_from_snapshot(
        &mut self,
        snapshot: &StoreSnapshot,
        puzzles_by_id: &HashMap<String, Puzzle>,
    ) {
        self.current_id = snapshot.current_id.clone();
        for (id, progress) in &snapshot.games {
            let Some(puzzle) = puzzles_by_id.get(id) else {
                continue;
            };
            let mut game =
                Game::new(id, &puzzle.title, &puzzle.body).with_placeholder(self.placeholder);
            game.apply_progress(progress);
            self.games.insert(id.clone(), game);
        }
    }

    /// Remove all trace of a puzzle. Returns whether anything changed.
    pub fn drop_puzzle(&mut self, puzzle_id: &str) -> bool {
        let existed = self.games.remove(puzzle_id).is_some();
        self.last_suggestion.remove(puzzle_id);
        if existed && self.current_id.as_deref() == Some(puzzle_id) {
            self.current_id = None;
        }
        existed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GuessReason;
    use chrono::Utc;

    fn sample_puzzles() -> Vec<Puzzle> {
        let now = Utc::now();
        vec![
            Puzzle {
                id: "bj".to_string(),
                title: "北京".to_string(),
                body: "首都".to_string(),
                created_at: now,
            },
            Puzzle {
                id: "sh".to_string(),
                title: "上海".to_string(),
                body: "港口".to_string(),
                created_at: now,
            },
        ]
    }

    /// Replays a fixed list of suggestions, recording what it was told
    /// about previous attempts.
    struct ScriptedSuggester {
        script: Vec<(&'static str, &'static str)>,
        calls: usize,
        seen_previous: Vec<Option<SuggesterAttempt>>,
    }

    impl ScriptedSuggester {
        fn new(script: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                script,
                calls: 0,
                seen_previous: Vec::new(),
            }
        }
    }

    impl Suggester for ScriptedSuggester {
        fn suggest_next(
            &mut self,
            _state: &StateSnapshot,
            previous: Option<&SuggesterAttempt>,
        ) -> crate::error::Result<Suggestion> {
            self.seen_previous.push(previous.cloned());
            let (guess, reason) = self.script[self.calls];
            self.calls += 1;
            Ok(Suggestion {
                guess: guess.to_string(),
                reason: reason.to_string(),
            })
        }
    }

    struct UnavailableSuggester;

    impl Suggester for UnavailableSuggester {
        fn suggest_next(
            &mut self,
            _state: &StateSnapshot,
            _previous: Option<&SuggesterAttempt>,
        ) -> crate::error::Result<Suggestion> {
            Err(CaiziError::SuggesterUnavailable("offline".to_string()))
        }
    }

    #[test]
    fn start_mode_parses() {
        assert_eq!(StartMode::from_str("resume").unwrap(), StartMode::Resume);
        assert_eq!(StartMode::from_str("restart").unwrap(), StartMode::Restart);
        assert!(matches!(
            StartMode::from_str("again"),
            Err(CaiziError::InvalidMode(_))
        ));
    }

    #[test]
    fn start_defaults_to_first_puzzle() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        let state = store.start(&puzzles, None, StartMode::Resume).unwrap();
        assert_eq!(state.puzzle_id, "bj");
        assert_eq!(store.current_id(), Some("bj"));
    }

    #[test]
    fn start_unknown_id_fails() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        assert!(matches!(
            store.start(&puzzles, Some("zzz"), StartMode::Resume),
            Err(CaiziError::PuzzleNotFound(_))
        ));
    }

    #[test]
    fn resume_keeps_progress_restart_discards_it() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();

        // Switching away and back resumes untouched
        store.start(&puzzles, Some("sh"), StartMode::Resume).unwrap();
        let state = store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        assert_eq!(state.guess_count, 1);
        assert_eq!(state.title_masked, "北□");

        let state = store
            .start(&puzzles, Some("bj"), StartMode::Restart)
            .unwrap();
        assert_eq!(state.guess_count, 0);
        assert_eq!(state.title_masked, "□□");
    }

    #[test]
    fn guess_without_active_game_fails() {
        let mut store = GameStore::default();
        assert!(matches!(store.guess("北"), Err(CaiziError::NoActiveGame)));
        assert!(matches!(
            store.use_hint(false),
            Err(CaiziError::NoActiveGame)
        ));
    }

    #[test]
    fn listing_reports_progress_per_puzzle() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();
        store.guess("京").unwrap();
        store.start(&puzzles, Some("sh"), StartMode::Resume).unwrap();
        store.guess("x").unwrap();

        let listing = store.list_puzzles(&puzzles);
        assert_eq!(listing.len(), 2);

        assert_eq!(listing[0].id, "bj");
        assert_eq!(listing[0].index, 1);
        assert_eq!(listing[0].status, PuzzleStatus::Completed);
        assert_eq!(listing[0].guess_count, 2);
        assert!(!listing[0].is_current);

        assert_eq!(listing[1].status, PuzzleStatus::InProgress);
        assert_eq!(listing[1].guess_count, 1);
        assert!(listing[1].is_current);
    }

    #[test]
    fn listing_marks_untouched_puzzles() {
        let puzzles = sample_puzzles();
        let store = GameStore::default();
        let listing = store.list_puzzles(&puzzles);
        assert!(listing
            .iter()
            .all(|entry| entry.status == PuzzleStatus::NotStarted && !entry.is_current));
    }

    #[test]
    fn ai_step_plays_first_legal_suggestion() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();

        let mut suggester = ScriptedSuggester::new(vec![
            ("北", "common opener"),  // repeat -> rejected locally
            ("多字", "two chars"),    // not a single char -> rejected
            ("京", "capital suffix"), // legal -> played
        ]);
        let outcome = store.ai_step(&mut suggester).unwrap();

        match outcome {
            AiStepOutcome::Stepped {
                guess,
                reason,
                result,
            } => {
                assert_eq!(guess, '京');
                assert_eq!(reason, "capital suffix");
                assert_eq!(result.status, GuessStatus::Correct);
                assert!(result.state.is_complete);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        // Rejections were threaded back with their status
        assert_eq!(suggester.seen_previous[0], None);
        let first = suggester.seen_previous[1].as_ref().unwrap();
        assert_eq!(first.guess, "北");
        assert_eq!(first.status, GuessStatus::Repeat);
        let second = suggester.seen_previous[2].as_ref().unwrap();
        assert_eq!(second.guess, "多字");
        assert_eq!(second.status, GuessStatus::Invalid);
    }

    #[test]
    fn ai_step_miss_still_ends_the_step() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();

        let mut suggester = ScriptedSuggester::new(vec![("z", "a stab in the dark")]);
        let outcome = store.ai_step(&mut suggester).unwrap();
        match outcome {
            AiStepOutcome::Stepped { result, .. } => {
                assert_eq!(result.status, GuessStatus::Wrong);
                assert_eq!(result.reason, GuessReason::Miss);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(suggester.calls, 1);
    }

    #[test]
    fn ai_step_gives_up_after_three_rejections() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();

        let mut suggester =
            ScriptedSuggester::new(vec![("北", "r1"), ("北", "r2"), ("", "r3")]);
        let result = store.ai_step(&mut suggester);
        assert!(matches!(result, Err(CaiziError::SuggesterExhausted(3))));
        // Nothing was played
        assert_eq!(store.state().unwrap().guess_count, 1);
    }

    #[test]
    fn ai_step_short_circuits_when_complete() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();
        store.guess("京").unwrap();

        let mut suggester = ScriptedSuggester::new(vec![]);
        let outcome = store.ai_step(&mut suggester).unwrap();
        assert!(matches!(outcome, AiStepOutcome::Done { ref state } if state.is_complete));
        assert_eq!(suggester.calls, 0);
    }

    #[test]
    fn ai_step_remembers_last_attempt_and_restart_clears_it() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();

        let mut suggester = ScriptedSuggester::new(vec![("q", "first try")]);
        store.ai_step(&mut suggester).unwrap();

        // Next step is told about the applied attempt
        let mut suggester = ScriptedSuggester::new(vec![("w", "second try")]);
        store.ai_step(&mut suggester).unwrap();
        let previous = suggester.seen_previous[0].as_ref().unwrap();
        assert_eq!(previous.guess, "q");
        assert_eq!(previous.status, GuessStatus::Wrong);

        // Restart wipes suggester memory along with progress
        store
            .start(&puzzles, Some("bj"), StartMode::Restart)
            .unwrap();
        let mut suggester = ScriptedSuggester::new(vec![("e", "fresh")]);
        store.ai_step(&mut suggester).unwrap();
        assert_eq!(suggester.seen_previous[0], None);
    }

    #[test]
    fn ai_step_propagates_unavailable_suggester() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        let result = store.ai_step(&mut UnavailableSuggester);
        assert!(matches!(result, Err(CaiziError::SuggesterUnavailable(_))));
    }

    #[test]
    fn hint_reveals_through_store() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        let outcome = store.use_hint(true).unwrap();
        assert_eq!(outcome.revealed, Some('北'));
        assert!(outcome.free);
        assert_eq!(outcome.state.guess_count, 1);
    }

    #[test]
    fn snapshot_round_trip() {
        let puzzles = sample_puzzles();
        let by_id = catalog::puzzle_map(&puzzles);

        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.guess("北").unwrap();
        store.guess("z").unwrap();

        let snapshot = store.export_snapshot();
        let mut restored = GameStore::default();
        restored.restore_from_snapshot(&snapshot, &by_id);

        assert_eq!(restored.current_id(), Some("bj"));
        let state = restored.state().unwrap();
        assert_eq!(state.guess_count, 2);
        assert_eq!(state.title_masked, "北□");
        assert_eq!(restored.export_snapshot(), snapshot);
    }

    #[test]
    fn restore_skips_deleted_puzzles() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        store.start(&puzzles, Some("sh"), StartMode::Resume).unwrap();
        let snapshot = store.export_snapshot();

        // "sh" vanished from the catalog
        let remaining = catalog::puzzle_map(&puzzles[..1]);
        let mut restored = GameStore::default();
        restored.restore_from_snapshot(&snapshot, &remaining);

        assert!(restored.has_game("bj"));
        assert!(!restored.has_game("sh"));
        // current_id still points at the missing puzzle; guessing reports
        // no active game rather than panicking
        assert!(matches!(
            restored.guess("上"),
            Err(CaiziError::NoActiveGame)
        ));
    }

    #[test]
    fn drop_puzzle_clears_current() {
        let puzzles = sample_puzzles();
        let mut store = GameStore::default();
        store.start(&puzzles, Some("bj"), StartMode::Resume).unwrap();
        assert!(store.drop_puzzle("bj"));
        assert_eq!(store.current_id(), None);
        assert!(!store.drop_puzzle("bj"));
    }

    #[test]
    fn snapshot_from_value_tolerates_garbage() {
        let snapshot = StoreSnapshot::from_value(&serde_json::json!({
            "current_id": 42,
            "games": "nope",
        }));
        assert_eq!(snapshot, StoreSnapshot::default());
    }
}
