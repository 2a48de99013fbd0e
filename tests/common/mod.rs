#![allow(dead_code)]

use async_trait::async_trait;
use premint_scraper::app::ports::{BrowserSession, EventSink, SessionLauncher};
use premint_scraper::config::ProbeConfig;
use premint_scraper::error::{Result, ScraperError};
use premint_scraper::PremintEvent;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const HEADING: &str = "//heading";
pub const REQUIREMENTS: &str = "//requirements";

pub fn probe_config() -> ProbeConfig {
    ProbeConfig {
        wait_timeout_secs: 30,
        poll_interval_ms: 250,
        heading_xpath: HEADING.to_string(),
        requirements_xpath: REQUIREMENTS.to_string(),
    }
}

/// How a fake page renders.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    /// `None` means the heading never shows up.
    pub heading: Option<String>,
    pub requirements: Option<String>,
    /// Number of lookups that miss before the heading is present.
    pub heading_after_polls: usize,
    /// Every lookup fails with this browser error.
    pub lookup_error: Option<String>,
}

impl FakePage {
    pub fn open(requirements: &str) -> Self {
        Self {
            heading: Some("\n  Register  \n".to_string()),
            requirements: Some(requirements.to_string()),
            ..Default::default()
        }
    }

    pub fn with_status(status: &str) -> Self {
        Self {
            heading: Some(status.to_string()),
            ..Default::default()
        }
    }

    pub fn never_renders() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub heading_lookups: AtomicUsize,
}

pub struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    counters: Arc<Counters>,
    current: Option<FakePage>,
    misses: usize,
    fail_navigation: bool,
}

impl FakeSession {
    pub fn new(pages: HashMap<String, FakePage>) -> Self {
        Self {
            pages: Arc::new(pages),
            counters: Arc::new(Counters::default()),
            current: None,
            misses: 0,
            fail_navigation: false,
        }
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::new(HashMap::new())
        }
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = String;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.fail_navigation {
            return Err(ScraperError::Browser("net::ERR_NAME_NOT_RESOLVED".into()));
        }
        self.current = Some(self.pages.get(url).cloned().unwrap_or_default());
        self.misses = 0;
        Ok(())
    }

    async fn find_element(&mut self, xpath: &str) -> Result<Option<String>> {
        let Some(page) = &self.current else {
            return Ok(None);
        };
        if let Some(message) = &page.lookup_error {
            return Err(ScraperError::Browser(message.clone()));
        }
        match xpath {
            HEADING => {
                self.counters.heading_lookups.fetch_add(1, Ordering::SeqCst);
                if self.misses < page.heading_after_polls {
                    self.misses += 1;
                    return Ok(None);
                }
                Ok(page.heading.clone())
            }
            REQUIREMENTS => Ok(page.requirements.clone()),
            _ => Ok(None),
        }
    }

    async fn read_attribute(&mut self, element: &String, name: &str) -> Result<Option<String>> {
        assert_eq!(name, "innerHTML");
        Ok(Some(element.clone()))
    }

    async fn close(self) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out sessions over a fixed set of pages.
pub struct FakeLauncher {
    pages: Arc<HashMap<String, FakePage>>,
    counters: Arc<Counters>,
    failing_launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new(pages: impl IntoIterator<Item = (&'static str, FakePage)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            counters: Arc::new(Counters::default()),
            failing_launches: AtomicUsize::new(0),
        }
    }

    /// The next `n` launches fail.
    pub fn fail_next_launches(self, n: usize) -> Self {
        self.failing_launches.store(n, Ordering::SeqCst);
        self
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession> {
        let failing = self
            .failing_launches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(ScraperError::Browser("could not open tab".into()));
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            pages: Arc::clone(&self.pages),
            counters: Arc::clone(&self.counters),
            current: None,
            misses: 0,
            fail_navigation: false,
        })
    }
}

/// Remembers every event it was asked to record.
#[derive(Default)]
pub struct RecordingSink {
    pub recorded: Mutex<Vec<PremintEvent>>,
    pub fail_for: HashSet<String>,
}

impl RecordingSink {
    pub fn failing_for(links: &[&str]) -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            fail_for: links.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn links(&self) -> Vec<String> {
        let mut links: Vec<String> = self
            .recorded
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.link().to_string())
            .collect();
        links.sort();
        links
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn record(&self, event: &PremintEvent) -> Result<()> {
        self.recorded.lock().unwrap().push(event.clone());
        if self.fail_for.contains(event.link().as_str()) {
            return Err(ScraperError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}
