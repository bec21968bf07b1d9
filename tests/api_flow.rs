//! End-to-end library flows: the facade over real files, across simulated
//! process restarts.

use caizi::api::GameApi;
use caizi::catalog;
use caizi::model::GuessStatus;
use caizi::session::SessionManager;
use caizi::settings::JsonSettings;
use caizi::store::StartMode;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn seed_puzzles(root: &Path) -> PathBuf {
    let puzzle_dir = root.join("puzzles");
    fs::create_dir_all(&puzzle_dir).unwrap();
    fs::write(puzzle_dir.join("bj.txt"), "北京\n中国的首都。\n").unwrap();
    fs::write(puzzle_dir.join("sh.txt"), "上海\n港口城市。\n").unwrap();
    puzzle_dir
}

/// Build the API the way the CLI does at startup: load the snapshot
/// against the current catalog, permissively.
fn boot(root: &Path) -> GameApi<JsonSettings> {
    let puzzle_dir = root.join("puzzles");
    let puzzles_by_id = catalog::load_puzzles(&puzzle_dir)
        .map(|puzzles| catalog::puzzle_map(&puzzles))
        .unwrap_or_default();

    let mut sessions = SessionManager::new(root.join("sessions.json"));
    sessions.load_from_disk(&puzzles_by_id, |_| None);

    let settings = JsonSettings::load(root.join("settings.json"));
    GameApi::new(puzzle_dir, sessions, settings)
}

#[test]
fn progress_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("bj"), StartMode::Resume).unwrap();
    api.guess("7", "北").unwrap();
    api.guess("7", "z").unwrap();
    drop(api);

    let mut api = boot(dir.path());
    let state = api
        .start("7", Some("bj"), StartMode::Resume)
        .unwrap();
    assert_eq!(state.guess_count, 2);
    assert_eq!(state.title_masked, "北□");
    assert_eq!(state.guessed_wrong, vec!['z']);
}

#[test]
fn completion_survives_a_restart_and_reveals_everything() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("bj"), StartMode::Resume).unwrap();
    api.guess("7", "北").unwrap();
    let result = api.guess("7", "京").unwrap();
    assert!(result.state.is_complete);
    drop(api);

    let api = boot(dir.path());
    let state = api.state("7").unwrap();
    assert!(state.is_complete);
    assert_eq!(state.title_masked, "北京");
    assert_eq!(state.body_masked, "中国的首都。");
}

#[test]
fn guessing_a_restored_complete_game_reports_finished() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("bj"), StartMode::Resume).unwrap();
    api.guess("7", "北").unwrap();
    api.guess("7", "京").unwrap();
    drop(api);

    let mut api = boot(dir.path());
    let result = api.guess("7", "海").unwrap();
    assert_eq!(result.status, GuessStatus::Finished);
    assert_eq!(result.state.guess_count, 2);
}

#[test]
fn players_are_isolated() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("bj"), StartMode::Resume).unwrap();
    api.guess("7", "北").unwrap();
    api.start("8", Some("bj"), StartMode::Resume).unwrap();

    assert_eq!(api.state("7").unwrap().guess_count, 1);
    assert_eq!(api.state("8").unwrap().guess_count, 0);
}

#[test]
fn overwriting_a_puzzle_wipes_progress_across_restarts() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("bj"), StartMode::Resume).unwrap();
    api.guess("7", "北").unwrap();
    api.create_puzzle(Some("bj"), "北平", "旧称。", true).unwrap();
    drop(api);

    let api = boot(dir.path());
    // Old progress against the replaced text is gone
    assert!(api.state("7").is_none());
    let listing = api.list_puzzles("7").unwrap();
    let entry = listing.iter().find(|entry| entry.id == "bj").unwrap();
    assert_eq!(entry.guess_count, 0);
    assert_eq!(entry.title, "北平");
}

#[test]
fn daily_selection_is_stable_across_restarts() {
    let dir = TempDir::new().unwrap();
    seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    let pick = api.daily("2026-08-06").unwrap();
    api.settings().save().unwrap();
    drop(api);

    let mut api = boot(dir.path());
    assert_eq!(api.daily("2026-08-06").unwrap(), pick);

    // The next day rotates to the other puzzle
    let next = api.daily("2026-08-07").unwrap();
    assert_ne!(next.puzzle_id, pick.puzzle_id);
}

#[test]
fn deleted_puzzle_progress_is_dropped_on_load() {
    let dir = TempDir::new().unwrap();
    let puzzle_dir = seed_puzzles(dir.path());

    let mut api = boot(dir.path());
    api.start("7", Some("sh"), StartMode::Resume).unwrap();
    api.guess("7", "上").unwrap();
    drop(api);

    // The puzzle file disappears out from under the snapshot
    fs::remove_file(puzzle_dir.join("sh.txt")).unwrap();

    let api = boot(dir.path());
    let listing = api.list_puzzles("7").unwrap();
    assert!(listing.iter().all(|entry| entry.id != "sh"));
    // current_id pointed at the vanished puzzle; there is no active game
    assert!(api.state("7").is_none());
}
