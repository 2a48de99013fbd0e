use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Top level of a Telegram "Export chat history" JSON file. Only the fields
/// link extraction needs are modelled; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct ExportFile {
    pub messages: Vec<ExportMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ExportMessage {
    #[serde(default)]
    pub text: MessageText,
}

/// `text` is a plain string for unformatted messages and a list of fragments
/// as soon as the message carries any entity.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Plain(String),
    Fragments(Vec<Fragment>),
}

impl Default for MessageText {
    fn default() -> Self {
        MessageText::Plain(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    Text(String),
    Entity(Entity),
}

#[derive(Debug, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
}

pub fn read_export(path: &Path) -> Result<ExportFile> {
    let content = fs::read_to_string(path).map_err(|e| ScraperError::input(path, e))?;
    let export: ExportFile =
        serde_json::from_str(&content).map_err(|e| ScraperError::input(path, e))?;
    debug!("Read {} messages from {}", export.messages.len(), path.display());
    Ok(export)
}

/// Reads a newline-delimited list, trimming each line and dropping blanks.
pub fn read_line_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ScraperError::input(path, e))?;
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}
