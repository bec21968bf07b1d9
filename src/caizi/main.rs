use caizi::api::GameApi;
use caizi::catalog;
use caizi::chars;
use caizi::config::CaiziConfig;
use caizi::daily;
use caizi::error::{CaiziError, Result};
use caizi::model::{GuessStatus, PuzzleListing, PuzzleStatus, StateSnapshot};
use caizi::session::SessionManager;
use caizi::settings::JsonSettings;
use caizi::store::StartMode;
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: GameApi<JsonSettings>,
    player: String,
    scores_path: PathBuf,
    placeholder: char,
    utc_offset_hours: i64,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Play { puzzle, restart }) => handle_play(&mut ctx, puzzle, restart),
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Daily) => handle_daily(&mut ctx),
        Some(Commands::Create {
            title,
            body,
            id,
            overwrite,
        }) => handle_create(&mut ctx, title, body.unwrap_or_default(), id, overwrite),
        Some(Commands::Delete { id }) => handle_delete(&mut ctx, id),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_root = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "caizi", "caizi")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CaiziError::Api("could not determine a data directory".to_string()))?,
    };

    let config = CaiziConfig::load(&data_root).unwrap_or_default();
    let placeholder = config.placeholder_char();
    let puzzle_dir = data_root.join("puzzles");

    // A missing catalog must not block startup; commands report it when
    // they actually need puzzles
    let puzzles_by_id = catalog::load_puzzles(&puzzle_dir)
        .map(|puzzles| catalog::puzzle_map(&puzzles))
        .unwrap_or_default();

    let mut sessions =
        SessionManager::new(data_root.join("sessions.json")).with_placeholder(placeholder);
    sessions.load_from_disk(&puzzles_by_id, |_| None);

    let settings = JsonSettings::load(data_root.join("settings.json"));

    Ok(AppContext {
        api: GameApi::new(puzzle_dir, sessions, settings),
        player: cli.player.clone(),
        scores_path: data_root.join("scores.json"),
        placeholder,
        utc_offset_hours: config.utc_offset_hours,
    })
}

fn handle_play(ctx: &mut AppContext, puzzle: Option<String>, restart: bool) -> Result<()> {
    let mode = if restart {
        StartMode::Restart
    } else {
        StartMode::Resume
    };
    let state = ctx.api.start(&ctx.player, puzzle.as_deref(), mode)?;
    ctx.api.settings().save()?;

    render_state(&state);
    if state.is_complete {
        println!("\n{}", "Already solved, nothing left to guess.".green());
        return Ok(());
    }
    println!(
        "\n{}",
        "Guess one character at a time. Commands: /hint, /state, /quit".dimmed()
    );

    let mut input = String::new();
    loop {
        print!("\nguess> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }
        let raw = input.trim();
        if raw.is_empty() {
            continue;
        }

        match raw {
            "/quit" | "/q" => return Ok(()),
            "/state" | "/s" => {
                if let Some(state) = ctx.api.state(&ctx.player) {
                    render_state(&state);
                }
                continue;
            }
            "/hint" | "/h" => {
                let outcome = ctx.api.hint(&ctx.player, false)?;
                match outcome.revealed {
                    Some(ch) => {
                        println!(
                            "{} {} {}",
                            "Revealed:".yellow(),
                            ch,
                            "(counts as a guess)".dimmed()
                        );
                        render_state(&outcome.state);
                        if outcome.state.is_complete {
                            finish(ctx, &outcome.state)?;
                            return Ok(());
                        }
                    }
                    None => println!("{}", "Nothing left to reveal.".dimmed()),
                }
                continue;
            }
            _ => {}
        }

        let result = ctx.api.guess(&ctx.player, raw)?;
        match result.status {
            GuessStatus::Correct => println!("{}", "Hit.".green()),
            GuessStatus::Wrong => println!("{}", "Miss.".red()),
            GuessStatus::Repeat => println!("{}", "Already guessed, not counted.".yellow()),
            GuessStatus::Invalid => {
                println!("{}", "Enter a single ideograph, digit, or letter.".yellow())
            }
            GuessStatus::Finished => println!("{}", "This puzzle is already solved.".dimmed()),
        }
        render_state(&result.state);
        if result.state.is_complete {
            finish(ctx, &result.state)?;
            return Ok(());
        }
    }
}

/// Record the completed game in the local best-score ledger and announce it.
fn finish(ctx: &AppContext, state: &StateSnapshot) -> Result<()> {
    record_best(
        &ctx.scores_path,
        &ctx.player,
        &state.puzzle_id,
        state.guess_count,
    )?;
    println!(
        "\n{}",
        format!("Solved in {} guesses.", state.guess_count)
            .green()
            .bold()
    );
    Ok(())
}

fn render_state(state: &StateSnapshot) {
    println!();
    println!("{}", state.title_masked.bold());
    if !state.body_masked.is_empty() {
        println!("\n{}", state.body_masked);
    }
    let wrong: String = state.guessed_wrong.iter().collect();
    println!(
        "\n{} {}/{}   {} {}   {} {}",
        "title".dimmed(),
        state.title_total - state.title_remaining,
        state.title_total,
        "guesses".dimmed(),
        state.guess_count,
        "wrong".dimmed(),
        if wrong.is_empty() {
            "-".to_string()
        } else {
            wrong
        }
    );
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let listing = ctx.api.list_puzzles(&ctx.player)?;
    print_listing(&listing, ctx.placeholder);
    Ok(())
}

const TITLE_WIDTH: usize = 24;

fn print_listing(entries: &[PuzzleListing], placeholder: char) {
    if entries.is_empty() {
        println!("No puzzles found.");
        return;
    }

    for entry in entries {
        let marker = if entry.is_current { "▶ " } else { "  " };
        let status = match entry.status {
            PuzzleStatus::NotStarted => "new    ".dimmed(),
            PuzzleStatus::InProgress => "playing".yellow(),
            PuzzleStatus::Completed => "solved ".green(),
        };
        // Unsolved titles stay hidden in the listing too
        let title = if entry.is_complete {
            entry.title.clone()
        } else {
            mask_title(&entry.title, placeholder)
        };
        let padding = TITLE_WIDTH.saturating_sub(title.width());
        let guesses = if entry.guess_count > 0 {
            format!("{:>3}", entry.guess_count)
        } else {
            "  -".to_string()
        };

        println!(
            "{}{:>3}. {}  {}{}  {}  {}  {}",
            marker,
            entry.index,
            status,
            title,
            " ".repeat(padding),
            guesses,
            format!("{:<12}", entry.id).dimmed(),
            format_time_ago(entry.created_at).dimmed()
        );
    }
}

fn mask_title(title: &str, placeholder: char) -> String {
    title
        .chars()
        .map(|ch| if chars::is_guessable(ch) { placeholder } else { ch })
        .collect()
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    formatter.convert(duration.to_std().unwrap_or_default())
}

fn handle_daily(ctx: &mut AppContext) -> Result<()> {
    let date = daily::local_date_string(ctx.utc_offset_hours);
    let selection = ctx.api.daily(&date)?;
    ctx.api.settings().save()?;

    let listing = ctx.api.list_puzzles(&ctx.player)?;
    match listing.iter().find(|entry| entry.id == selection.puzzle_id) {
        Some(entry) => println!(
            "{}  puzzle #{} ({})",
            selection.date.bold(),
            entry.index,
            selection.puzzle_id
        ),
        None => println!("{}  {}", selection.date.bold(), selection.puzzle_id),
    }
    println!(
        "{}",
        format!("caizi play -z {}", selection.puzzle_id).dimmed()
    );
    Ok(())
}

fn handle_create(
    ctx: &mut AppContext,
    title: String,
    body: String,
    id: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let created = ctx
        .api
        .create_puzzle(id.as_deref(), &title, &body, overwrite)?;
    if created.overwrote {
        println!(
            "{}",
            format!("Replaced puzzle {}; all progress on it was wiped.", created.id).yellow()
        );
    } else {
        println!("{}", format!("Created puzzle {}.", created.id).green());
    }
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, id: String) -> Result<()> {
    ctx.api.delete_puzzle(&id)?;
    println!("{}", format!("Deleted puzzle {}.", id).green());
    Ok(())
}

/// Host-side best-score ledger: player → puzzle → fewest guesses.
fn record_best(scores_path: &Path, player: &str, puzzle_id: &str, guess_count: u32) -> Result<()> {
    let mut scores: BTreeMap<String, BTreeMap<String, u32>> = fs::read_to_string(scores_path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();

    let player_scores = scores.entry(player.to_string()).or_default();
    let best = player_scores.entry(puzzle_id.to_string()).or_insert(guess_count);
    *best = (*best).min(guess_count);

    if let Some(parent) = scores_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(scores_path, serde_json::to_string_pretty(&scores)?)?;
    Ok(())
}
