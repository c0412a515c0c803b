use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::models::enums::PromptLanguage;

/// Application-level constants
pub const APP_NAME: &str = "medcheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed storage key; the medication list lives in `<data_dir>/<key>.json`.
pub const STORAGE_KEY: &str = "medications";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Accepted output budget per analysis.
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1..=8192;
/// Accepted model call timeout in seconds.
pub const TIMEOUT_SECS_RANGE: RangeInclusive<u64> = 1..=300;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "MEDCHECK_MODEL";
pub const ENV_API_BASE_URL: &str = "MEDCHECK_API_BASE_URL";
pub const ENV_MAX_TOKENS: &str = "MEDCHECK_MAX_TOKENS";
pub const ENV_TIMEOUT_SECS: &str = "MEDCHECK_TIMEOUT_SECS";
pub const ENV_LANGUAGE: &str = "MEDCHECK_LANGUAGE";
pub const ENV_DATA_DIR: &str = "MEDCHECK_DATA_DIR";
pub const ENV_BIND: &str = "MEDCHECK_BIND";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medcheck=info,tower_http=info"
}

/// Get the application data directory.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Settings for the model call.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// `None` when no credential is configured. Checked at analyze time.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub language: PromptLanguage,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            language: PromptLanguage::default(),
        }
    }
}

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub analyzer: AnalyzerConfig,
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. Values that fail to parse fall back
    /// to the default and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let analyzer = AnalyzerConfig {
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get(ENV_API_BASE_URL)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            max_tokens: parse_in_range(
                ENV_MAX_TOKENS,
                get(ENV_MAX_TOKENS),
                MAX_TOKENS_RANGE,
                DEFAULT_MAX_TOKENS,
            ),
            timeout_secs: parse_in_range(
                ENV_TIMEOUT_SECS,
                get(ENV_TIMEOUT_SECS),
                TIMEOUT_SECS_RANGE,
                DEFAULT_TIMEOUT_SECS,
            ),
            language: parse_or_default(ENV_LANGUAGE, get(ENV_LANGUAGE), PromptLanguage::default()),
        };

        let default_bind: SocketAddr = ([127, 0, 0, 1], 8080).into();

        Self {
            analyzer,
            data_dir: get(ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(app_data_dir),
            bind_addr: parse_or_default(ENV_BIND, get(ENV_BIND), default_bind),
        }
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "Invalid configuration value, using default");
            default
        }),
    }
}

fn parse_in_range<T>(key: &str, raw: Option<String>, range: RangeInclusive<T>, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let value = parse_or_default(key, raw, default);
    if range.contains(&value) {
        value
    } else {
        tracing::warn!(
            key,
            value = %value,
            min = %range.start(),
            max = %range.end(),
            "Configuration value out of range, using default"
        );
        default
    }
}
