use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read input file {path:?}: {message}")]
    Input { path: PathBuf, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {waited:?} waiting for element {selector}")]
    Timeout { selector: String, waited: Duration },

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl ScraperError {
    pub fn input(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Input {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
