//! The puzzle catalog: a directory of `.txt` files.
//!
//! Each file is one puzzle: first line title, remaining lines body, file
//! stem as the id, mtime as `created_at`. The catalog is the source of
//! truth for puzzle content; progress snapshots never duplicate it.

use crate::error::{CaiziError, Result};
use crate::model::Puzzle;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const PUZZLE_EXT: &str = "txt";

/// Parse a single puzzle file: first line title, rest body.
pub fn parse_puzzle_file(path: &Path) -> Result<Puzzle> {
    let id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CaiziError::CatalogUnavailable(format!("invalid puzzle file name: {}", path.display()))
        })?;

    let raw = fs::read_to_string(path)?;
    let content = raw.trim_start_matches('\u{feff}');
    let mut lines = content.lines();
    let title = lines.next().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err(CaiziError::CatalogUnavailable(format!(
            "puzzle file has an empty title: {}",
            path.display()
        )));
    }
    let body = lines.collect::<Vec<_>>().join("\n");
    let body = body.trim_start_matches('\n').to_string();

    let created_at: DateTime<Utc> = fs::metadata(path)?.modified()?.into();

    Ok(Puzzle {
        id,
        title,
        body,
        created_at,
    })
}

/// Load every puzzle in the directory, sorted by filename. A missing or
/// empty directory is `CatalogUnavailable`; the catalog is required for
/// play, but callers at startup treat the failure as "no puzzles yet".
pub fn load_puzzles(dir: &Path) -> Result<Vec<Puzzle>> {
    if !dir.exists() {
        return Err(CaiziError::CatalogUnavailable(format!(
            "puzzle directory does not exist: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == PUZZLE_EXT))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(CaiziError::CatalogUnavailable(format!(
            "no puzzle files in {}",
            dir.display()
        )));
    }

    files.iter().map(|path| parse_puzzle_file(path)).collect()
}

/// Resolve a puzzle by id; no id means the first catalog entry.
pub fn choose_puzzle<'a>(puzzles: &'a [Puzzle], puzzle_id: Option<&str>) -> Result<&'a Puzzle> {
    match puzzle_id {
        None => puzzles.first().ok_or_else(|| {
            CaiziError::CatalogUnavailable("the puzzle catalog is empty".to_string())
        }),
        Some(id) => puzzles
            .iter()
            .find(|puzzle| puzzle.id == id)
            .ok_or_else(|| CaiziError::PuzzleNotFound(id.to_string())),
    }
}

/// Index the catalog by id, for snapshot restores.
pub fn puzzle_map(puzzles: &[Puzzle]) -> HashMap<String, Puzzle> {
    puzzles
        .iter()
        .map(|puzzle| (puzzle.id.clone(), puzzle.clone()))
        .collect()
}

// Ids become filenames, so anything outside this set is a path-injection
// hazard and gets stripped.
fn is_safe_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || crate::chars::is_cjk(ch)
}

/// Strip unsafe characters from a raw id. `None` when nothing survives.
pub fn sanitize_puzzle_id(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|ch| is_safe_id_char(*ch)).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Accept an id only if it is already in sanitized form.
pub fn validate_puzzle_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match sanitize_puzzle_id(raw) {
        Some(cleaned) if cleaned == raw => Some(cleaned),
        _ => None,
    }
}

/// Result of writing a puzzle file. When `overwrote` is set the caller
/// must wipe stale per-player progress for the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPuzzle {
    pub id: String,
    pub overwrote: bool,
}

/// Write a puzzle file. Without an id a timestamped one is generated;
/// existing files are only replaced when `overwrite` is set.
pub fn create_puzzle_file(
    dir: &Path,
    puzzle_id: Option<&str>,
    title: &str,
    body: &str,
    overwrite: bool,
) -> Result<CreatedPuzzle> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CaiziError::Api("puzzle title cannot be empty".to_string()));
    }

    let id = puzzle_id
        .and_then(sanitize_puzzle_id)
        .unwrap_or_else(|| format!("puzzle_{}", Utc::now().timestamp()));

    let path = dir.join(format!("{}.{}", id, PUZZLE_EXT));
    let existed = path.exists();
    if existed && !overwrite {
        return Err(CaiziError::Api(format!(
            "puzzle file already exists: {}",
            id
        )));
    }

    fs::create_dir_all(dir)?;
    fs::write(&path, format!("{}\n{}\n", title, body.trim_end()))?;

    Ok(CreatedPuzzle {
        id,
        overwrote: existed,
    })
}

/// Delete a puzzle file by id.
pub fn delete_puzzle_file(dir: &Path, puzzle_id: &str) -> Result<()> {
    let id = validate_puzzle_id(puzzle_id)
        .ok_or_else(|| CaiziError::Api(format!("invalid puzzle id: {}", puzzle_id)))?;
    let path = dir.join(format!("{}.{}", id, PUZZLE_EXT));
    if !path.exists() {
        return Err(CaiziError::PuzzleNotFound(id));
    }
    fs::remove_file(path)?;
    Ok(())
}
