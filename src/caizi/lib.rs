//! # Caizi Architecture
//!
//! Caizi is a **UI-agnostic puzzle-game library**. The binary is a thin CLI
//! client; the same core could serve an HTTP frontend or any other UI.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + args.rs)                              │
//! │  - Parses arguments, renders masked text, reads guesses     │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Facade wiring catalog + sessions + settings together     │
//! │  - Persists the session snapshot after every mutation       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Game Layer (engine.rs, store.rs, daily.rs)                 │
//! │  - Pure rules: guess state machine, masking, completion     │
//! │  - Per-player stores, daily rotation                        │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (session.rs, settings.rs, catalog.rs)        │
//! │  - Durable session snapshot (atomic rewrite)                │
//! │  - Key/value settings, puzzle files on disk                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular arguments, returns
//! `Result<...>`, and never writes to stdout/stderr or calls
//! `std::process::exit`. Guess outcomes (`correct`, `wrong`, `repeat`,
//! `invalid`, `finished`) are ordinary values, not errors; only caller
//! contract violations and collaborator failures surface as [`error::CaiziError`].
//!
//! ## Persistence Model
//!
//! All per-player progress lives in one JSON document rewritten atomically
//! (write to a temporary path, then rename) after every mutating operation.
//! Reads are permissive: a missing or corrupt document degrades to empty
//! state and never prevents startup. Puzzle content is *not* persisted with
//! progress; it is re-read from the puzzle catalog on restore, so deleted
//! or overwritten puzzles shed their stale progress.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, the entry point for all operations
//! - [`engine`]: The rules engine for a single puzzle
//! - [`store`]: Per-player collection of in-progress games
//! - [`session`]: All players' stores + durable snapshot
//! - [`daily`]: Deterministic no-repeat daily puzzle rotation
//! - [`catalog`]: Puzzle files on disk (first line = title)
//! - [`settings`]: Key/value settings + daily-pool curation traits
//! - [`suggester`]: Pluggable next-guess suggester contract
//! - [`chars`]: Which characters are guessable
//! - [`model`]: Core value types (snapshots, results, listings)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod catalog;
pub mod chars;
pub mod config;
pub mod daily;
pub mod engine;
pub mod error;
pub mod model;
pub mod session;
pub mod settings;
pub mod store;
pub mod suggester;
