use crate::error::{env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default base URL of the calendar provider service
pub const DEFAULT_PROVIDER_URL: &str = "http://localhost:8793";

/// Default path of the persisted calendar selection
pub const DEFAULT_SELECTION_FILE: &str = "config/selected_calendars.toml";

/// Default interval between provider change checks, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Main configuration structure for the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the calendar provider service
    pub provider_url: String,
    /// Bearer token for the provider, if it requires one
    pub provider_token: Option<String>,
    /// Path of the persisted calendar selection file
    pub selection_path: PathBuf,
    /// Seconds between provider change checks
    pub poll_interval_secs: u64,
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let provider_url =
            env::var("UPNEXT_PROVIDER_URL").unwrap_or_else(|_| String::from(DEFAULT_PROVIDER_URL));

        let provider_token = env::var("UPNEXT_PROVIDER_TOKEN").ok().filter(|t| !t.is_empty());

        let selection_path = env::var("UPNEXT_SELECTION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SELECTION_FILE));

        let poll_interval_secs = match env::var("UPNEXT_POLL_INTERVAL") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| env_error("UPNEXT_POLL_INTERVAL must be a number of seconds"))?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Config {
            provider_url,
            provider_token,
            selection_path,
            poll_interval_secs,
        })
    }
}
