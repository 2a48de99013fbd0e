use crate::error::Result;
use crate::types::PremintEvent;
use async_trait::async_trait;

/// One automated browsing session (a tab), exclusively owned by one worker.
#[async_trait]
pub trait BrowserSession: Send {
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Single lookup, no waiting. `Ok(None)` means "not rendered yet".
    async fn find_element(&mut self, xpath: &str) -> Result<Option<Self::Element>>;

    async fn read_attribute(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Tears the session down. Must be called on every exit path.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

#[async_trait]
pub trait SessionLauncher: Send + Sync + 'static {
    type Session: BrowserSession + 'static;

    async fn launch(&self) -> Result<Self::Session>;
}

/// Durable destination for active events.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    async fn record(&self, event: &PremintEvent) -> Result<()>;
}
