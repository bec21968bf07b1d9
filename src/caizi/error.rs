use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaiziError {
    #[error("Puzzle not found: {0}")]
    PuzzleNotFound(String),

    #[error("Unsupported start mode: {0} (expected resume or restart)")]
    InvalidMode(String),

    #[error("No game in progress; start one first")]
    NoActiveGame,

    #[error("Puzzle catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Daily puzzle pool is exhausted")]
    DailyPoolExhausted,

    #[error("Suggester unavailable: {0}")]
    SuggesterUnavailable(String),

    #[error("Suggester produced no legal guess in {0} attempts")]
    SuggesterExhausted(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, CaiziError>;
