use snafu::{ResultExt, ensure};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use autovote::scheduler::{DEFAULT_POLL_INTERVAL, DailyTime};
use autovote::utils::generate_secret;
use autovote::vote::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VOTE_API_URL, DEFAULT_VOTE_ORIGIN,
    DEFAULT_VOTE_REFERER, VoteTarget,
};

use crate::Result;
use crate::error::{ConfigSnafu, CoreSnafu};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub csrf_secret: String,
    pub tokens_file: PathBuf,
    pub log_file: PathBuf,
    pub schedule: ScheduleConfig,
    pub vote: VoteTarget,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub at: DailyTime,
    pub poll_interval: Duration,
}

impl Config {
    pub fn build() -> Result<Self> {
        // Build the config from ENV vars
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            match lookup(key) {
                Some(val) if !val.trim().is_empty() => val.trim().to_string(),
                _ => default.to_string(),
            }
        };

        let host = var("HOST", "127.0.0.1");
        let port = parse_number::<u16>("PORT", &var("PORT", "8501"))?;
        let tokens_file: PathBuf = var("TOKENS_FILE", "tokens.json").into();
        let log_file: PathBuf = var("LOG_FILE", "run_tokens.log").into();

        let at = var("SCHEDULE_TIME", "02:00")
            .parse::<DailyTime>()
            .context(CoreSnafu)?;
        let poll_secs = parse_number::<u64>(
            "SCHEDULER_POLL_SECS",
            &var(
                "SCHEDULER_POLL_SECS",
                &DEFAULT_POLL_INTERVAL.as_secs().to_string(),
            ),
        )?;

        let api_url = var("VOTE_API_URL", DEFAULT_VOTE_API_URL);
        let origin = var("VOTE_ORIGIN", DEFAULT_VOTE_ORIGIN);
        let referer = var("VOTE_REFERER", DEFAULT_VOTE_REFERER);
        let timeout_secs = parse_number::<u64>(
            "REQUEST_TIMEOUT_SECS",
            &var(
                "REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            ),
        )?;

        let csrf_secret = lookup("CSRF_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_secret);

        // Validate config values
        ensure!(
            port > 0,
            ConfigSnafu {
                msg: "Server port is required.".to_string()
            }
        );

        ensure!(
            poll_secs > 0,
            ConfigSnafu {
                msg: "Scheduler poll interval must be at least 1 second.".to_string()
            }
        );

        ensure!(
            timeout_secs > 0,
            ConfigSnafu {
                msg: "Request timeout must be at least 1 second.".to_string()
            }
        );

        ensure!(
            Url::parse(&api_url).is_ok(),
            ConfigSnafu {
                msg: format!("VOTE_API_URL is not a valid URL: {}", api_url)
            }
        );

        Ok(Config {
            server: ServerConfig { host, port },
            csrf_secret,
            tokens_file,
            log_file,
            schedule: ScheduleConfig {
                at,
                poll_interval: Duration::from_secs(poll_secs),
            },
            vote: VoteTarget {
                api_url,
                origin,
                referer,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| crate::Error::Config {
        msg: format!("{} must be a valid number, got {}", key, value),
    })
}
