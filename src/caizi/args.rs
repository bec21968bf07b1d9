use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for dev builds.
/// Format: "0.2.0" for releases, "0.2.0@abc1234 2026-08-06 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "caizi")]
#[command(version = get_version())]
#[command(about = "Character-guessing puzzle game", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Player identity progress is tracked under
    #[arg(short, long, global = true, default_value = "local")]
    pub player: String,

    /// Override the data directory (puzzles, sessions, settings)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a puzzle interactively
    Play {
        /// Puzzle id (defaults to the first in the catalog)
        #[arg(short = 'z', long)]
        puzzle: Option<String>,

        /// Discard existing progress and start over
        #[arg(long)]
        restart: bool,
    },

    /// List puzzles with your progress
    #[command(alias = "ls")]
    List,

    /// Show today's daily puzzle
    Daily,

    /// Add a puzzle to the catalog
    Create {
        /// First line of the puzzle file, i.e. the text to guess
        title: String,

        /// Body text shown masked below the title
        #[arg(required = false)]
        body: Option<String>,

        /// Puzzle id (defaults to a generated one)
        #[arg(long)]
        id: Option<String>,

        /// Replace an existing puzzle, wiping everyone's progress on it
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove a puzzle and all progress on it
    #[command(alias = "rm")]
    Delete {
        /// Puzzle id
        id: String,
    },
}
