use anyhow::Context;
use clap::Parser;
use premint_scraper::config::{Config, Overrides, RunSettings};
use premint_scraper::filter::{self, ExclusionSet};
use premint_scraper::infra::ChromeLauncher;
use premint_scraper::sink::FileSink;
use premint_scraper::{extractor, logging, menu, metrics};
use premint_scraper::{Coordinator, InputMode, PremintEvent, Prober};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "premint_scraper")]
#[command(about = "Finds open premint registrations in a Telegram export")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to ./premint.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of concurrent browser workers
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Links origin: 1 = Telegram export, 2 = own list of links
    #[arg(long, short = 'm')]
    mode: Option<InputMode>,

    /// Skip links listed in the ignore file
    #[arg(long, conflicts_with = "no_ignore")]
    ignore: bool,

    /// Do not use the ignore file
    #[arg(long)]
    no_ignore: bool,

    /// Directory holding result.json, my_links.txt and links_to_ignore.txt
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the output files are appended to (defaults to the data dir)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Seconds to wait for each page element to render
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let use_ignore_list = match (self.ignore, self.no_ignore) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            threads: self.threads,
            mode: self.mode,
            use_ignore_list,
            wait_timeout_secs: self.timeout_secs,
            headed: self.headed,
            metrics_port: self.metrics_port,
        }
    }
}

async fn run(config: Config, settings: RunSettings) -> anyhow::Result<()> {
    let candidates = extractor::extract(&settings.source)?;
    let ignore = ExclusionSet::load(settings.ignore_file.as_deref())?;
    let links = filter::filter(candidates, &ignore);
    info!("Parsed {} unique premint links", links.len());

    if links.is_empty() {
        warn!("Nothing to scrape");
        return Ok(());
    }

    let sink = Arc::new(
        FileSink::open(&settings.output_dir)
            .await
            .context("Failed to open output files")?,
    );
    let launcher = Arc::new(
        ChromeLauncher::start(&config.browser)
            .await
            .context("Failed to start browser")?,
    );

    let events: Vec<PremintEvent> = links.into_iter().map(PremintEvent::new).collect();
    let coordinator = Coordinator::new(Arc::clone(&launcher), sink, Prober::new(&config.probe));
    coordinator.run(events, settings.threads).await;

    if let Err(e) = launcher.shutdown().await {
        warn!("Browser shutdown failed: {}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(cli.overrides());
    config.validate()?;
    menu::complete(&mut config)?;
    let settings = config.run_settings()?;

    if let Some(port) = config.metrics_port {
        metrics::init_metrics(port);
    }

    let span = info_span!("run", run_id = %Uuid::new_v4(), threads = settings.threads);
    run(config, settings).instrument(span).await
}
