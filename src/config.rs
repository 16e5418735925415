use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ORACLE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ORACLE_MODEL: &str = "gpt-5-thinking";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub openai_api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub files_root: PathBuf,
    /// Prefix of the artifact URLs handed back to callers, relative or absolute.
    pub public_base_url: String,
    pub max_download_bytes: u64,
    pub download_timeout_secs: u64,
    /// 0 keeps jobs forever.
    pub retention_hours: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub process_hook_token: Option<String>,
}

impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StorageConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours.saturating_mul(SECS_PER_HOUR))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("process_hook_token", &self.process_hook_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            llm: LLMConfig {
                openai_api_key: None,
                base_url: DEFAULT_ORACLE_BASE_URL.to_string(),
                model: DEFAULT_ORACLE_MODEL.to_string(),
                timeout_secs: 180,
            },
            storage: StorageConfig {
                files_root: PathBuf::from("./files"),
                public_base_url: "/files".to_string(),
                max_download_bytes: 50 * 1024 * 1024,
                download_timeout_secs: 180,
                retention_hours: 168,
                sweep_interval_secs: 3600,
            },
            auth: AuthConfig {
                process_hook_token: None,
            },
            log_dir: None,
        }
    }
}

/// Reads an optional variable, treating blank values as unset.
fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

const SECS_PER_HOUR: u64 = 3600;

/// Hours of retention, rejected when they do not fit in seconds.
fn checked_retention_hours(hours: u64) -> Result<u64> {
    hours
        .checked_mul(SECS_PER_HOUR)
        .map(|_| hours)
        .with_context(|| format!("JOB_RETENTION_HOURS is too large: {}", hours))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_or("PORT", defaults.server.port)?,
                host: non_empty("HOST").unwrap_or(defaults.server.host),
                cors_allowed_origins: non_empty("ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.server.cors_allowed_origins),
            },
            llm: LLMConfig {
                openai_api_key: non_empty("OPENAI_API_KEY"),
                base_url: non_empty("OPENAI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.llm.base_url),
                model: non_empty("ORACLE_MODEL").unwrap_or(defaults.llm.model),
                timeout_secs: parse_or("ORACLE_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
            },
            storage: StorageConfig {
                files_root: non_empty("FILES_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.files_root),
                public_base_url: non_empty("PUBLIC_FILES_URL")
                    .map(|p| p.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.storage.public_base_url),
                max_download_bytes: parse_or("MAX_DOWNLOAD_BYTES", defaults.storage.max_download_bytes)?,
                download_timeout_secs: parse_or(
                    "DOWNLOAD_TIMEOUT_SECS",
                    defaults.storage.download_timeout_secs,
                )?,
                retention_hours: checked_retention_hours(parse_or(
                    "JOB_RETENTION_HOURS",
                    defaults.storage.retention_hours,
                )?)?,
                sweep_interval_secs: parse_or(
                    "JOB_SWEEP_INTERVAL_SECS",
                    defaults.storage.sweep_interval_secs,
                )?,
            },
            auth: AuthConfig {
                process_hook_token: non_empty("PROCESS_HOOK_TOKEN"),
            },
            log_dir: non_empty("LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn oracle_configured(&self) -> bool {
        self.llm.openai_api_key.is_some()
    }
}
