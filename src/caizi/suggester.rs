//! The pluggable next-guess suggester contract.
//!
//! A suggester proposes the next character given the visible snapshot and
//! the record of its previous attempt. It never retries on its own;
//! bounded retry on rejection is [`crate::store::GameStore::ai_step`]'s
//! job. Implementations that call out over the network must own their own
//! timeout and surface failures as
//! [`CaiziError::SuggesterUnavailable`](crate::error::CaiziError::SuggesterUnavailable).

use crate::error::Result;
use crate::model::{GuessStatus, StateSnapshot};
use serde::Serialize;

/// A proposed guess. `guess` is raw suggester output and may be illegal;
/// the store validates it before play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub guess: String,
    pub reason: String,
}

/// What happened to a previous suggestion. Fed back on the next call so
/// the suggester stops repeating rejected guesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggesterAttempt {
    pub guess: String,
    pub reason: String,
    pub status: GuessStatus,
}

pub trait Suggester {
    fn suggest_next(
        &mut self,
        state: &StateSnapshot,
        previous: Option<&SuggesterAttempt>,
    ) -> Result<Suggestion>;
}
