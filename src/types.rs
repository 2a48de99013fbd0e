use crate::constants::{DISCORD_MARKER, TWITTER_MARKER};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A normalized, absolute URL believed to point at a premint registration page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateLink(String);

impl CandidateLink {
    /// Wraps a string that has already been normalized (or deliberately left
    /// as-is, as in list mode).
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CandidateLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration status of an event. Decided exactly once by the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityState {
    #[default]
    Unknown,
    Active,
    Inactive,
}

/// One evaluation unit: a link plus whatever the prober learned about it.
#[derive(Debug, Clone)]
pub struct PremintEvent {
    link: CandidateLink,
    state: ActivityState,
    twitter_links: Vec<String>,
    discord_links: Vec<String>,
}

impl PremintEvent {
    pub fn new(link: CandidateLink) -> Self {
        Self {
            link,
            state: ActivityState::Unknown,
            twitter_links: Vec::new(),
            discord_links: Vec::new(),
        }
    }

    pub fn link(&self) -> &CandidateLink {
        &self.link
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivityState::Active
    }

    pub fn twitter_links(&self) -> &[String] {
        &self.twitter_links
    }

    pub fn discord_links(&self) -> &[String] {
        &self.discord_links
    }

    /// Returns false if the state had already been decided.
    pub fn mark_active(&mut self) -> bool {
        self.decide(ActivityState::Active)
    }

    pub fn mark_inactive(&mut self) -> bool {
        self.decide(ActivityState::Inactive)
    }

    fn decide(&mut self, state: ActivityState) -> bool {
        if self.state != ActivityState::Unknown {
            return false;
        }
        self.state = state;
        true
    }

    /// Files a requirement href under twitter or discord. Twitter wins when
    /// both markers are present. Ignored unless the event is active.
    pub fn push_requirement(&mut self, href: &str) {
        if !self.is_active() {
            return;
        }
        if href.contains(TWITTER_MARKER) {
            self.twitter_links.push(href.to_string());
        } else if href.contains(DISCORD_MARKER) {
            self.discord_links.push(href.to_string());
        }
    }

    /// `<link>,<twitter list>,<discord list>` with the lists rendered as
    /// bracketed literals, e.g. `https://x,['https://twitter.com/a'],[]`.
    pub fn summary_line(&self) -> String {
        format!(
            "{},{},{}",
            self.link,
            list_literal(&self.twitter_links),
            list_literal(&self.discord_links)
        )
    }
}

fn list_literal(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Quotes like a Python string literal: single quotes unless the text holds
/// a single quote and no double quote, control characters escaped so an
/// entry can never break the line.
fn quote(item: &str) -> String {
    let delimiter = if item.contains('\'') && !item.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(item.len() + 2);
    out.push(delimiter);
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Where candidate links come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Telegram history export (`result.json`).
    Export,
    /// Flat newline-delimited list of links.
    List,
}

impl InputMode {
    pub fn menu_index(self) -> usize {
        match self {
            InputMode::Export => 0,
            InputMode::List => 1,
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "export" => Ok(InputMode::Export),
            "2" | "list" => Ok(InputMode::List),
            other => Err(format!("unknown input mode '{other}', expected 1 or 2")),
        }
    }
}
