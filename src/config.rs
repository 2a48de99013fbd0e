use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DATA_DIR, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_SECS,
    EXPORT_FILE, HEADING_XPATH, IGNORE_FILE, LINKS_FILE, REQUIREMENTS_XPATH,
};
use crate::error::{Result, ScraperError};
use crate::types::InputMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Everything a run can be configured with. Loaded from `premint.toml`
/// when present, then overridden from the command line. Run parameters
/// still missing afterwards are asked for interactively.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub export_file: PathBuf,
    pub links_file: PathBuf,
    pub ignore_file: PathBuf,
    /// Defaults to `data_dir`.
    pub output_dir: Option<PathBuf>,
    pub threads: Option<usize>,
    pub mode: Option<InputMode>,
    pub use_ignore_list: Option<bool>,
    pub metrics_port: Option<u16>,
    pub probe: ProbeConfig,
    pub browser: BrowserSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            export_file: PathBuf::from(EXPORT_FILE),
            links_file: PathBuf::from(LINKS_FILE),
            ignore_file: PathBuf::from(IGNORE_FILE),
            output_dir: None,
            threads: None,
            mode: None,
            use_ignore_list: None,
            metrics_port: None,
            probe: ProbeConfig::default(),
            browser: BrowserSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub heading_xpath: String,
    pub requirements_xpath: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            heading_xpath: HEADING_XPATH.to_string(),
            requirements_xpath: REQUIREMENTS_XPATH.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome/Chromium binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub threads: Option<usize>,
    pub mode: Option<InputMode>,
    pub use_ignore_list: Option<bool>,
    pub wait_timeout_secs: Option<u64>,
    pub headed: bool,
    pub metrics_port: Option<u16>,
}

/// Which input file to read links from.
#[derive(Debug, Clone)]
pub struct InputSource {
    pub mode: InputMode,
    pub export_file: PathBuf,
    pub links_file: PathBuf,
}

/// Fully resolved parameters for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub threads: usize,
    pub source: InputSource,
    pub ignore_file: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Config {
    /// Reads `path`, or `premint.toml` in the working directory. An explicit
    /// path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if overrides.output_dir.is_some() {
            self.output_dir = overrides.output_dir;
        }
        if overrides.threads.is_some() {
            self.threads = overrides.threads;
        }
        if overrides.mode.is_some() {
            self.mode = overrides.mode;
        }
        if overrides.use_ignore_list.is_some() {
            self.use_ignore_list = overrides.use_ignore_list;
        }
        if let Some(secs) = overrides.wait_timeout_secs {
            self.probe.wait_timeout_secs = secs;
        }
        if overrides.headed {
            self.browser.headless = false;
        }
        if overrides.metrics_port.is_some() {
            self.metrics_port = overrides.metrics_port;
        }
    }

    /// Relative file names are resolved against `data_dir`.
    fn data_path(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(ScraperError::Config("threads must be at least 1".into()));
        }
        if self.probe.wait_timeout_secs == 0 {
            return Err(ScraperError::Config("probe.wait_timeout_secs must be at least 1".into()));
        }
        if self.probe.poll_interval_ms == 0 {
            return Err(ScraperError::Config("probe.poll_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// Produces the settings for a run once threads, mode and the ignore
    /// flag are all known.
    pub fn run_settings(&self) -> Result<RunSettings> {
        self.validate()?;
        let threads = self
            .threads
            .ok_or_else(|| ScraperError::Config("thread count not set".into()))?;
        let mode = self
            .mode
            .ok_or_else(|| ScraperError::Config("input mode not set".into()))?;
        let use_ignore = self.use_ignore_list.unwrap_or(false);

        Ok(RunSettings {
            threads,
            source: InputSource {
                mode,
                export_file: self.data_path(&self.export_file),
                links_file: self.data_path(&self.links_file),
            },
            ignore_file: use_ignore.then(|| self.data_path(&self.ignore_file)),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
        })
    }
}
