// Link discovery
pub const PREMINT_MARKER: &str = "premint.xyz/";
pub const BARE_PREFIX: &str = "premint";
pub const WWW_PREFIX: &str = "www.premint";

// Registration page structure
pub const HEADING_XPATH: &str =
    r#"//*[@id="st-container"]/div/div/div/section[2]/div/div/div[2]/form/div/div[1]/div[1]"#;
pub const REQUIREMENTS_XPATH: &str =
    r#"//*[@id="st-container"]/div/div/div/section[2]/div/div/div[2]/form/div"#;
pub const OPEN_STATUS: &str = "Register";
pub const INNER_HTML: &str = "innerHTML";

pub const TWITTER_MARKER: &str = "twitter";
pub const DISCORD_MARKER: &str = "discord";

pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// Files
pub const DEFAULT_CONFIG_FILE: &str = "premint.toml";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const EXPORT_FILE: &str = "result.json";
pub const LINKS_FILE: &str = "my_links.txt";
pub const IGNORE_FILE: &str = "links_to_ignore.txt";

pub const SUMMARY_FILE: &str = "final_summary_data.txt";
pub const ACTIVE_LINKS_FILE: &str = "active_premint_links.txt";
pub const TWITTER_FILE: &str = "twitters_to_subscribe.txt";
pub const DISCORD_FILE: &str = "discords_to_enter.txt";
