use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{critical, domain::ChatId, errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);
pub const DEFAULT_LOG_FILE: &str = "program.log";

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Typed configuration, loaded once at startup and passed to every component.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    // Polling
    pub endpoint: String,
    pub retry_period: Duration,
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Load from the process environment.
    ///
    /// `.env` is not read here: the binary applies it before logging starts,
    /// so the log destination can come from it too.
    pub fn load() -> Result<Self> {
        Self::from_lookup(env_str)
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// Every missing required variable is logged at critical level before the
    /// error is returned.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).and_then(non_empty);

        let missing: Vec<&str> = REQUIRED_VARS
            .into_iter()
            .filter(|key| required(*key).is_none())
            .collect();
        if !missing.is_empty() {
            for key in &missing {
                critical!("Missing required environment variable {key}");
            }
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let practicum_token = required("PRACTICUM_TOKEN").unwrap_or_default();
        let telegram_token = required("TELEGRAM_TOKEN").unwrap_or_default();
        let telegram_chat_id = ChatId(required("TELEGRAM_CHAT_ID").unwrap_or_default());

        let endpoint = lookup("PRACTICUM_ENDPOINT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let retry_period = match parse_secs(&lookup, "RETRY_PERIOD")? {
            Some(d) if d.is_zero() => {
                return Err(Error::Config("RETRY_PERIOD must be positive".to_string()));
            }
            Some(d) => d,
            None => DEFAULT_RETRY_PERIOD,
        };
        let http_timeout = parse_secs(&lookup, "HWB_HTTP_TIMEOUT")?;

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            retry_period,
            http_timeout,
        })
    }
}

/// Log destination; read separately because logging starts before [`Config`].
pub fn log_file_path() -> PathBuf {
    env_str("HWB_LOG_FILE")
        .and_then(non_empty)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key).and_then(non_empty) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|s| Some(Duration::from_secs(s)))
        .map_err(|_| Error::Config(format!("{key} must be a whole number of seconds, got {raw:?}")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

pub fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
