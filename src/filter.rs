use crate::error::Result;
use crate::input;
use crate::types::CandidateLink;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Links the user never wants probed. Loaded once, read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct ExclusionSet {
    links: HashSet<String>,
}

impl ExclusionSet {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let links: HashSet<String> = input::read_line_list(path)?.into_iter().collect();
        debug!("Loaded {} links to ignore from {}", links.len(), path.display());
        Ok(Self { links })
    }

    pub fn contains(&self, link: &CandidateLink) -> bool {
        self.links.contains(link.as_str())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Drops every candidate present in `ignore` by exact match, keeping order.
pub fn filter(candidates: Vec<CandidateLink>, ignore: &ExclusionSet) -> Vec<CandidateLink> {
    if ignore.is_empty() {
        return candidates;
    }
    let before = candidates.len();
    let kept: Vec<CandidateLink> = candidates
        .into_iter()
        .filter(|link| !ignore.contains(link))
        .collect();
    info!("Ignore list removed {} of {} candidate links", before - kept.len(), before);
    kept
}
