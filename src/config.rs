use clap::Parser;

/// T20 chase win-probability tracker
#[derive(Parser, Debug, Clone)]
#[command(name = "cricwin", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// CricAPI base URL
    #[arg(
        long,
        env = "CRIC_API_URL",
        default_value = "https://api.cricapi.com/v1"
    )]
    pub cric_api_url: String,

    /// CricAPI key (live mode is unavailable without it)
    #[arg(long, env = "CRIC_API_KEY")]
    pub cric_api_key: Option<String>,

    /// Live feed request timeout in seconds
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value = "10")]
    pub feed_timeout_secs: u64,

    /// Live-mode auto-refresh interval in seconds (10–120)
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "30")]
    pub poll_interval_secs: u64,

    /// Target assumed when the feed has not published one yet
    #[arg(long, env = "DEFAULT_TARGET", default_value = "150")]
    pub default_target: i32,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.cric_api_url)
            .map_err(|e| anyhow::anyhow!("invalid cric_api_url: {}", e))?;
        if !(10..=120).contains(&self.poll_interval_secs) {
            anyhow::bail!("poll_interval_secs must be between 10 and 120");
        }
        if self.feed_timeout_secs == 0 {
            anyhow::bail!("feed_timeout_secs must be positive");
        }
        if self.default_target < 1 {
            anyhow::bail!("default_target must be at least 1");
        }
        Ok(())
    }
}
