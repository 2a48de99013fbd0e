use crate::config::InputSource;
use crate::constants::{BARE_PREFIX, PREMINT_MARKER, WWW_PREFIX};
use crate::error::Result;
use crate::input::{self, ExportMessage, Fragment, MessageText};
use crate::types::{CandidateLink, InputMode};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Rewrites scheme-less premint links to `https://www.premint...`.
/// Anything else is assumed to already carry a scheme and is left alone.
pub fn normalize_link(raw: &str) -> CandidateLink {
    if raw.starts_with(BARE_PREFIX) {
        CandidateLink::new(format!("https://www.{raw}"))
    } else if raw.starts_with(WWW_PREFIX) {
        CandidateLink::new(format!("https://{raw}"))
    } else {
        CandidateLink::new(raw)
    }
}

/// Pulls every premint URL out of `link` and `text_link` entities, in
/// message order then fragment order.
fn raw_premint_urls(messages: &[ExportMessage]) -> impl Iterator<Item = &str> {
    messages
        .iter()
        .filter_map(|message| match &message.text {
            MessageText::Fragments(fragments) => Some(fragments),
            MessageText::Plain(_) => None,
        })
        .flatten()
        .filter_map(|fragment| match fragment {
            Fragment::Entity(entity) => match entity.kind.as_str() {
                "link" => Some(entity.text.as_str()),
                "text_link" => entity.href.as_deref(),
                _ => None,
            },
            Fragment::Text(_) => None,
        })
        .filter(|url| url.contains(PREMINT_MARKER))
}

pub fn extract_from_messages(messages: &[ExportMessage]) -> Vec<CandidateLink> {
    dedup(raw_premint_urls(messages).map(normalize_link))
}

/// List mode: the file is trusted as-is, only duplicates are dropped.
pub fn extract_from_lines(lines: Vec<String>) -> Vec<CandidateLink> {
    dedup(lines.into_iter().map(CandidateLink::new))
}

/// First occurrence wins; relative order is otherwise preserved.
fn dedup(links: impl Iterator<Item = CandidateLink>) -> Vec<CandidateLink> {
    let mut seen = HashSet::new();
    links.filter(|link| seen.insert(link.clone())).collect()
}

#[instrument(skip(source), fields(mode = ?source.mode))]
pub fn extract(source: &InputSource) -> Result<Vec<CandidateLink>> {
    let links = match source.mode {
        InputMode::Export => {
            let export = input::read_export(&source.export_file)?;
            debug!("Scanning {} messages for premint links", export.messages.len());
            extract_from_messages(&export.messages)
        }
        InputMode::List => extract_from_lines(input::read_line_list(&source.links_file)?),
    };
    info!("Extracted {} unique candidate links", links.len());
    Ok(links)
}
