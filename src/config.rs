//! Centralized configuration management for userdesk

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the user service, e.g. `http://localhost:3000`
    pub api_url: String,
    /// Directory the log file is written to
    pub log_dir: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Terminal UI timing
    pub ui: UiConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Terminal UI timing configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Interval between housekeeping ticks (milliseconds)
    pub tick_rate_ms: u64,
    /// How long a status message stays in the status bar (seconds)
    pub status_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "userdesk/0.1.0".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            status_timeout_seconds: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("USERDESK_API_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let log_dir = lookup("USERDESK_LOG_DIR")
            .unwrap_or_else(|| ".".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_var(&lookup, "USERDESK_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: lookup("USERDESK_USER_AGENT")
                .unwrap_or_else(|| "userdesk/0.1.0".to_string()),
        };

        let ui = UiConfig {
            tick_rate_ms: parse_var(&lookup, "USERDESK_TICK_RATE_MS")?.unwrap_or(250),
            status_timeout_seconds: parse_var(&lookup, "USERDESK_STATUS_TIMEOUT_SECONDS")?
                .unwrap_or(5),
        };

        Ok(Config {
            api_url,
            log_dir,
            http,
            ui,
        })
    }

    /// Replace the API base URL, e.g. from a command line flag
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Get UI tick rate as Duration
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(1))
    }

    /// Get status message lifetime as Duration
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.ui.status_timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid USERDESK_API_URL: {}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "USERDESK_API_URL must use http or https, got '{}'",
                url.scheme()
            ));
        }

        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Cannot create log directory: {}", self.log_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse a variable as a specific type
fn parse_var<T, F>(lookup: &F, var_name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match lookup(var_name) {
        Some(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        None => Ok(None),
    }
}
