use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::quiz::flow::DEFAULT_QUESTIONS_PER_ATTEMPT;
use crate::storage::{DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT};

const CONTENT_PATH_VAR: &str = "QUIZ_CONTENT_PATH";
const BIND_ADDR_VAR: &str = "QUIZ_BIND_ADDR";
const QUESTIONS_VAR: &str = "QUIZ_QUESTIONS_PER_ATTEMPT";
const IDLE_SECS_VAR: &str = "QUIZ_SESSION_IDLE_SECS";
const MAX_SESSIONS_VAR: &str = "QUIZ_MAX_SESSIONS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value:?}")]
    BindAddr { var: &'static str, value: String },
    #[error("{var} must be a whole number of at least 1, got {value:?}")]
    NotPositive { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub content_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub questions_per_attempt: usize,
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_path: PathBuf::from("snippets.csv"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            questions_per_attempt: DEFAULT_QUESTIONS_PER_ATTEMPT,
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_sessions: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Reads settings from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(CONTENT_PATH_VAR) {
            config.content_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = value.parse().map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(QUESTIONS_VAR) {
            config.questions_per_attempt = positive(QUESTIONS_VAR, value)?;
        }
        if let Some(value) = lookup(IDLE_SECS_VAR) {
            config.session_idle_timeout = Duration::from_secs(positive(IDLE_SECS_VAR, value)? as u64);
        }
        if let Some(value) = lookup(MAX_SESSIONS_VAR) {
            config.max_sessions = positive(MAX_SESSIONS_VAR, value)?;
        }

        Ok(config)
    }
}

fn positive(var: &'static str, value: String) -> Result<usize, ConfigError> {
    let parsed = value.trim().parse::<usize>();
    match parsed {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::NotPositive { var, value }),
    }
}
