//! # API Facade
//!
//! The single entry point for all game operations, regardless of the UI in
//! front of it. The facade wires the three collaborators together (the
//! puzzle catalog on disk, the [`SessionManager`], and a settings store
//! that also curates the daily pool) and persists the session snapshot
//! after every mutating operation, so a crash between requests loses at
//! most the request in flight.
//!
//! The facade returns data structures, never strings, and does no I/O
//! beyond its collaborators. Completion is signaled only through
//! [`StateSnapshot::is_complete`]; recording finished games into a score
//! ledger is the host's job.
//!
//! `GameApi<S>` is generic over the settings store: production uses
//! [`JsonSettings`](crate::settings::JsonSettings), tests use
//! [`MemSettings`](crate::settings::MemSettings).

use crate::catalog::{self, CreatedPuzzle};
use crate::daily::{self, DailySelection};
use crate::error::Result;
use crate::model::{GuessResult, HintOutcome, Puzzle, PuzzleListing, StateSnapshot};
use crate::session::SessionManager;
use crate::settings::{DailyCurator, SettingsStore};
use crate::store::{AiStepOutcome, GameStore, StartMode};
use crate::suggester::Suggester;
use std::path::PathBuf;

pub struct GameApi<S: SettingsStore + DailyCurator> {
    puzzle_dir: PathBuf,
    sessions: SessionManager,
    settings: S,
}

impl<S: SettingsStore + DailyCurator> GameApi<S> {
    pub fn new(puzzle_dir: impl Into<PathBuf>, sessions: SessionManager, settings: S) -> Self {
        Self {
            puzzle_dir: puzzle_dir.into(),
            sessions,
            settings,
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    fn catalog(&self) -> Result<Vec<Puzzle>> {
        catalog::load_puzzles(&self.puzzle_dir)
    }

    /// The catalog annotated with one player's progress.
    pub fn list_puzzles(&self, player_id: &str) -> Result<Vec<PuzzleListing>> {
        let puzzles = self.catalog()?;
        let listing = match self.sessions.store(player_id) {
            Some(store) => store.list_puzzles(&puzzles),
            None => GameStore::default().list_puzzles(&puzzles),
        };
        Ok(listing)
    }

    /// Start or resume a puzzle for a player. A start that creates or
    /// resets progress also marks the puzzle played and demotes it from
    /// the daily-candidate pool: a spoiled puzzle makes a poor daily.
    pub fn start(
        &mut self,
        player_id: &str,
        puzzle_id: Option<&str>,
        mode: StartMode,
    ) -> Result<StateSnapshot> {
        let puzzles = self.catalog()?;
        let resolved = catalog::choose_puzzle(&puzzles, puzzle_id)?.id.clone();

        let store = self.sessions.get_or_create_store(player_id);
        let existed = store.has_game(&resolved);
        let state = store.start(&puzzles, puzzle_id, mode)?;

        if mode == StartMode::Restart || !existed {
            self.settings.mark_played(&state.puzzle_id);
            if self
                .settings
                .daily_ids()
                .iter()
                .any(|id| id == &state.puzzle_id)
            {
                self.settings.set_daily_flag(&state.puzzle_id, false);
            }
        }

        self.sessions.save()?;
        Ok(state)
    }

    /// Snapshot of the player's current game, if any.
    pub fn state(&self, player_id: &str) -> Option<StateSnapshot> {
        self.sessions.store(player_id).and_then(GameStore::state)
    }

    pub fn guess(&mut self, player_id: &str, input: &str) -> Result<GuessResult> {
        let result = self.sessions.get_or_create_store(player_id).guess(input)?;
        self.sessions.save()?;
        Ok(result)
    }

    pub fn hint(&mut self, player_id: &str, free: bool) -> Result<HintOutcome> {
        let outcome = self
            .sessions
            .get_or_create_store(player_id)
            .use_hint(free)?;
        self.sessions.save()?;
        Ok(outcome)
    }

    pub fn ai_step(
        &mut self,
        player_id: &str,
        suggester: &mut dyn Suggester,
    ) -> Result<AiStepOutcome> {
        let outcome = self
            .sessions
            .get_or_create_store(player_id)
            .ai_step(suggester)?;
        self.sessions.save()?;
        Ok(outcome)
    }

    /// The daily selection for a date string (see
    /// [`daily::local_date_string`]).
    pub fn daily(&mut self, date: &str) -> Result<DailySelection> {
        let puzzles = self.catalog()?;
        daily::pick_daily_puzzle(&puzzles, &mut self.settings, date)
    }

    /// Write a puzzle file. Overwriting an existing puzzle wipes every
    /// player's progress on it first, since the old progress describes text
    /// that no longer exists.
    pub fn create_puzzle(
        &mut self,
        puzzle_id: Option<&str>,
        title: &str,
        body: &str,
        overwrite: bool,
    ) -> Result<CreatedPuzzle> {
        let created =
            catalog::create_puzzle_file(&self.puzzle_dir, puzzle_id, title, body, overwrite)?;
        if created.overwrote {
            self.sessions.remove_puzzle(&created.id)?;
        }
        self.sessions.save()?;
        Ok(created)
    }

    /// Delete a puzzle file and every player's progress on it.
    pub fn delete_puzzle(&mut self, puzzle_id: &str) -> Result<()> {
        catalog::delete_puzzle_file(&self.puzzle_dir, puzzle_id)?;
        self.sessions.remove_puzzle(puzzle_id)?;
        self.sessions.save()?;
        Ok(())
    }
}
