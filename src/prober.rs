use crate::app::ports::BrowserSession;
use crate::config::ProbeConfig;
use crate::constants::{INNER_HTML, OPEN_STATUS};
use crate::error::{Result, ScraperError};
use crate::types::PremintEvent;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Polls `find_element` until the element shows up or `timeout` elapses.
/// A timeout comes back as `ScraperError::Timeout`, never as a panic.
pub async fn wait_for_element<S: BrowserSession>(
    session: &mut S,
    xpath: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<S::Element> {
    match tokio::time::timeout(timeout, poll_until_present(session, xpath, poll_interval)).await {
        Ok(found) => found,
        Err(_) => Err(ScraperError::Timeout {
            selector: xpath.to_string(),
            waited: timeout,
        }),
    }
}

async fn poll_until_present<S: BrowserSession>(
    session: &mut S,
    xpath: &str,
    poll_interval: Duration,
) -> Result<S::Element> {
    loop {
        if let Some(element) = session.find_element(xpath).await? {
            return Ok(element);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Every `href` of every anchor in an HTML fragment, in document order.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InactiveReason {
    /// The status heading never rendered within the wait window.
    HeadingTimeout,
    /// The heading rendered but did not read `Register`.
    NotOpen(String),
    /// The page is open but its requirements never rendered.
    RequirementsTimeout,
    /// The browser session failed before the page could be read.
    Session(String),
}

impl fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InactiveReason::HeadingTimeout => write!(f, "status heading did not render"),
            InactiveReason::NotOpen(status) => write!(f, "registration status is '{status}'"),
            InactiveReason::RequirementsTimeout => write!(f, "requirements did not render"),
            InactiveReason::Session(message) => write!(f, "session error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Active,
    Inactive(InactiveReason),
    /// Registration is open but the page could not be read completely.
    /// Never recorded.
    Failed(InactiveReason),
}

/// Decides whether a premint page is open for registration and, if so,
/// collects the twitter/discord requirement links.
#[derive(Debug, Clone)]
pub struct Prober {
    heading_xpath: String,
    requirements_xpath: String,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            heading_xpath: config.heading_xpath.clone(),
            requirements_xpath: config.requirements_xpath.clone(),
            wait_timeout: config.wait_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    #[instrument(skip(self, session, event), fields(link = %event.link()))]
    pub async fn probe<S: BrowserSession>(
        &self,
        session: &mut S,
        event: &mut PremintEvent,
    ) -> ProbeOutcome {
        let status = match self.read_status(session, event.link().as_str()).await {
            Ok(status) => status,
            Err(reason) => {
                event.mark_inactive();
                return ProbeOutcome::Inactive(reason);
            }
        };

        if status != OPEN_STATUS {
            event.mark_inactive();
            return ProbeOutcome::Inactive(InactiveReason::NotOpen(status));
        }

        // Open, but only recorded once the requirements have been read.
        let html = match self.read_inner_html(session, &self.requirements_xpath).await {
            Ok(html) => html,
            Err(e) => {
                event.mark_inactive();
                let reason = if e.is_timeout() {
                    InactiveReason::RequirementsTimeout
                } else {
                    InactiveReason::Session(e.to_string())
                };
                return ProbeOutcome::Failed(reason);
            }
        };

        event.mark_active();
        for href in anchor_hrefs(&html) {
            event.push_requirement(&href);
        }
        debug!(
            twitter = event.twitter_links().len(),
            discord = event.discord_links().len(),
            "Collected requirement links"
        );
        ProbeOutcome::Active
    }

    async fn read_status<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &str,
    ) -> std::result::Result<String, InactiveReason> {
        session
            .navigate(url)
            .await
            .map_err(|e| InactiveReason::Session(e.to_string()))?;
        match self.read_inner_html(session, &self.heading_xpath).await {
            Ok(html) => Ok(html.trim().to_string()),
            Err(e) if e.is_timeout() => Err(InactiveReason::HeadingTimeout),
            Err(e) => Err(InactiveReason::Session(e.to_string())),
        }
    }

    async fn read_inner_html<S: BrowserSession>(&self, session: &mut S, xpath: &str) -> Result<String> {
        let element = wait_for_element(session, xpath, self.wait_timeout, self.poll_interval).await?;
        Ok(session
            .read_attribute(&element, INNER_HTML)
            .await?
            .unwrap_or_default())
    }
}
