use crate::engine::DEFAULT_PLACEHOLDER;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_UTC_OFFSET_HOURS: i64 = 8;

/// Configuration for caizi, stored in the data directory as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaiziConfig {
    /// Glyph shown for hidden characters (e.g., "□", "＊")
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Offset from UTC used to decide when the daily puzzle rolls over
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i64,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_utc_offset() -> i64 {
    DEFAULT_UTC_OFFSET_HOURS
}

impl Default for CaiziConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl CaiziConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: CaiziConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// The placeholder as a char; falls back to the default glyph if the
    /// configured string is empty.
    pub fn placeholder_char(&self) -> char {
        self.placeholder.chars().next().unwrap_or(DEFAULT_PLACEHOLDER)
    }
}
