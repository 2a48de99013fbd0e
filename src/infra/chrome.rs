use crate::app::ports::{BrowserSession, SessionLauncher};
use crate::config::BrowserSettings;
use crate::constants::INNER_HTML;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

fn browser_err(e: impl ToString) -> ScraperError {
    ScraperError::Browser(e.to_string())
}

/// CDP answers an XPath search with no hits, or a node that went away
/// between search and resolve, with these errors. Anything else is a real
/// session failure.
fn is_missing_node(e: &CdpError) -> bool {
    match e {
        CdpError::NotFound => true,
        CdpError::Chrome(err) => {
            err.message.contains("Invalid search result range")
                || err.message.contains("No search session with given id")
                || err.message.contains("Could not find node with given id")
        }
        _ => false,
    }
}

/// One Chromium process shared by all workers. Every session is its own tab.
pub struct ChromeLauncher {
    browser: Mutex<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromeLauncher {
    pub async fn start(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(ScraperError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_err)?;
        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });
        info!(headless = settings.headless, "Browser started");

        Ok(Self {
            browser: Mutex::new(browser),
            handler: Mutex::new(Some(handler)),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(browser_err)?;
            if let Err(e) = browser.wait().await {
                warn!("Browser process did not exit cleanly: {}", e);
            }
        }
        if let Some(handler) = self.handler.lock().await.take() {
            if let Err(e) = handler.await {
                warn!("Browser handler task failed: {}", e);
            }
        }
        info!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(browser_err)?;
        Ok(ChromeSession { page })
    }
}

pub struct ChromeSession {
    page: Page,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(browser_err)?;
        Ok(())
    }

    async fn find_element(&mut self, xpath: &str) -> Result<Option<Element>> {
        match self.page.find_xpaths(xpath).await {
            Ok(elements) => Ok(elements.into_iter().next()),
            Err(e) if is_missing_node(&e) => {
                trace!("Element {} not present yet: {}", xpath, e);
                Ok(None)
            }
            Err(e) => Err(browser_err(e)),
        }
    }

    async fn read_attribute(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        // innerHTML is a DOM property, not an attribute.
        let value = if name == INNER_HTML {
            element.inner_html().await
        } else {
            element.attribute(name).await
        };
        value.map_err(browser_err)
    }

    async fn close(self) -> Result<()> {
        self.page.close().await.map_err(browser_err)
    }
}
