use crate::app::ports::EventSink;
use crate::constants::{ACTIVE_LINKS_FILE, DISCORD_FILE, SUMMARY_FILE, TWITTER_FILE};
use crate::error::Result;
use crate::types::PremintEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// An append-only text file shared by every worker. Each `append_line`
/// holds the lock for the whole write, so lines never interleave.
#[derive(Debug)]
pub struct AppendStream {
    file: Mutex<File>,
}

impl AppendStream {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.into()).await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub async fn append_line(&self, text: &str) -> Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// The four output files. Writes for one event go out in a fixed order and
/// are not rolled back if a later one fails.
#[derive(Debug)]
pub struct FileSink {
    summary: AppendStream,
    active_links: AppendStream,
    twitter_links: AppendStream,
    discord_links: AppendStream,
}

impl FileSink {
    pub async fn open(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).await?;
        let sink = Self {
            summary: AppendStream::open(output_dir.join(SUMMARY_FILE)).await?,
            active_links: AppendStream::open(output_dir.join(ACTIVE_LINKS_FILE)).await?,
            twitter_links: AppendStream::open(output_dir.join(TWITTER_FILE)).await?,
            discord_links: AppendStream::open(output_dir.join(DISCORD_FILE)).await?,
        };
        debug!("Opened output files in {}", output_dir.display());
        Ok(sink)
    }
}

#[async_trait]
impl EventSink for FileSink {
    #[instrument(skip(self, event), fields(link = %event.link()))]
    async fn record(&self, event: &PremintEvent) -> Result<()> {
        self.summary.append_line(&event.summary_line()).await?;
        self.active_links.append_line(event.link().as_str()).await?;
        for link in event.twitter_links() {
            self.twitter_links.append_line(link).await?;
        }
        for link in event.discord_links() {
            self.discord_links.append_line(link).await?;
        }
        Ok(())
    }
}
