//! The rules engine for a single puzzle.
//!
//! A [`Game`] owns one puzzle's guessing state: the ordered correct/wrong
//! lists, the guess counter, and the derived character sets. It is mutated
//! only through [`Game::guess`] and [`Game::reveal_hint`]; everything else
//! is a pure read. Completion means every guessable character of the
//! *title* has been guessed; body characters help (they count as hits)
//! but are not required.

use crate::chars;
use crate::model::{GameProgress, GuessReason, GuessResult, GuessStatus, HintOutcome, StateSnapshot};
use std::collections::HashSet;

/// Fullwidth block glyph shown for hidden characters.
pub const DEFAULT_PLACEHOLDER: char = '□';

pub struct Game {
    puzzle_id: String,
    title: String,
    body: String,
    placeholder: char,
    guess_count: u32,
    guessed_correct: Vec<char>,
    guessed_wrong: Vec<char>,
    correct_set: HashSet<char>,
    wrong_set: HashSet<char>,
    // Derived at construction, never mutated.
    title_chars: HashSet<char>,
    all_chars: HashSet<char>,
}

fn guessable_chars(text: &str) -> HashSet<char> {
    text.chars().filter(|ch| chars::is_guessable(*ch)).collect()
}

impl Game {
    pub fn new(
        puzzle_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let body = body.into();
        let title_chars = guessable_chars(&title);
        let mut all_chars = guessable_chars(&body);
        all_chars.extend(&title_chars);
        Self {
            puzzle_id: puzzle_id.into(),
            title,
            body,
            placeholder: DEFAULT_PLACEHOLDER,
            guess_count: 0,
            guessed_correct: Vec::new(),
            guessed_wrong: Vec::new(),
            correct_set: HashSet::new(),
            wrong_set: HashSet::new(),
            title_chars,
            all_chars,
        }
    }

    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    pub fn guess_count(&self) -> u32 {
        self.guess_count
    }

    /// The title is fully guessed.
    pub fn is_complete(&self) -> bool {
        self.title_chars
            .iter()
            .all(|ch| self.correct_set.contains(ch))
    }

    fn mask_text(&self, text: &str, reveal_all: bool) -> String {
        if reveal_all {
            return text.to_string();
        }
        text.chars()
            .map(|ch| {
                if !chars::is_guessable(ch) {
                    // Punctuation and whitespace carry no hidden content
                    ch
                } else if self.correct_set.contains(&ch) {
                    ch
                } else {
                    self.placeholder
                }
            })
            .collect()
    }

    /// Side-effect-free snapshot of the visible state. Once complete, the
    /// full text is shown.
    pub fn get_state(&self) -> StateSnapshot {
        let complete = self.is_complete();
        StateSnapshot {
            puzzle_id: self.puzzle_id.clone(),
            title_masked: self.mask_text(&self.title, complete),
            body_masked: self.mask_text(&self.body, complete),
            guessed_correct: self.guessed_correct.clone(),
            guessed_wrong: self.guessed_wrong.clone(),
            guess_count: self.guess_count,
            title_total: self.title_chars.len(),
            title_remaining: self
                .title_chars
                .iter()
                .filter(|ch| !self.correct_set.contains(ch))
                .count(),
            is_complete: complete,
            placeholder: self.placeholder,
        }
    }

    fn result(&self, status: GuessStatus, reason: GuessReason) -> GuessResult {
        GuessResult {
            status,
            reason,
            state: self.get_state(),
        }
    }

    /// Process one guess. Outcomes are values, never errors, and only a
    /// novel legal guess (hit or miss) increments the counter.
    pub fn guess(&mut self, input: &str) -> GuessResult {
        if self.is_complete() {
            return self.result(GuessStatus::Finished, GuessReason::Completed);
        }
        let ch = match chars::only_char(input) {
            Some(ch) => ch,
            None => return self.result(GuessStatus::Invalid, GuessReason::NotSingleChar),
        };
        if !chars::is_guessable(ch) {
            return self.result(GuessStatus::Invalid, GuessReason::NotGuessable);
        }
        if self.correct_set.contains(&ch) || self.wrong_set.contains(&ch) {
            return self.result(GuessStatus::Repeat, GuessReason::AlreadyGuessed);
        }

        let (status, reason) = if self.all_chars.contains(&ch) {
            self.guessed_correct.push(ch);
            self.correct_set.insert(ch);
            (GuessStatus::Correct, GuessReason::Hit)
        } else {
            self.guessed_wrong.push(ch);
            self.wrong_set.insert(ch);
            (GuessStatus::Wrong, GuessReason::Miss)
        };

        self.guess_count += 1;
        self.result(status, reason)
    }

    /// The first title character not yet attempted, left to right. Each
    /// distinct character is considered once, so a repeated title character
    /// is not re-offered. `None` once every distinct title character has
    /// been tried.
    pub fn next_optimal_guess(&self) -> Option<char> {
        let mut seen = HashSet::new();
        for ch in self.title.chars() {
            if !chars::is_guessable(ch) || !seen.insert(ch) {
                continue;
            }
            if self.correct_set.contains(&ch) || self.wrong_set.contains(&ch) {
                continue;
            }
            return Some(ch);
        }
        None
    }

    /// Reveal one not-yet-guessed title character, mark it correct, and
    /// count it as a guess. A revealed character is always a hit: title
    /// characters cannot sit in the wrong list.
    pub fn reveal_hint(&mut self, free: bool) -> HintOutcome {
        let revealed = self.next_optimal_guess();
        if let Some(ch) = revealed {
            self.guessed_correct.push(ch);
            self.correct_set.insert(ch);
            self.guess_count += 1;
        }
        HintOutcome {
            revealed,
            free,
            state: self.get_state(),
        }
    }

    /// The persistable subset of this game, excluding puzzle content.
    pub fn export_progress(&self) -> GameProgress {
        GameProgress {
            guess_count: self.guess_count,
            guessed_correct: self.guessed_correct.clone(),
            guessed_wrong: self.guessed_wrong.clone(),
        }
    }

    /// Restore persisted progress, defensively: non-guessable entries are
    /// discarded and the derived sets are rebuilt from what survives.
    pub fn apply_progress(&mut self, progress: &GameProgress) {
        self.guessed_correct = progress
            .guessed_correct
            .iter()
            .copied()
            .filter(|ch| chars::is_guessable(*ch))
            .collect();
        self.guessed_wrong = progress
            .guessed_wrong
            .iter()
            .copied()
            .filter(|ch| chars::is_guessable(*ch))
            .collect();
        self.correct_set = self.guessed_correct.iter().copied().collect();
        self.wrong_set = self.guessed_wrong.iter().copied().collect();
        self.guess_count = progress.guess_count;
    }
}
