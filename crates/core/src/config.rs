use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Process configuration: defaults, patched by an optional TOML file, then
/// environment variables, then programmatic overrides, then validated.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub merchant: MerchantConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct MerchantConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Sent to the merchant as the `UCP-Agent` header.
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub merchant_url: Option<String>,
    pub merchant_api_key: Option<String>,
    pub merchant_timeout_secs: Option<u64>,
    pub agent_name: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            merchant: MerchantConfig {
                base_url: "http://localhost:8000".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            agent: AgentConfig { name: "cartwright-agent".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    merchant: Option<MerchantPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct MerchantPatch {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cartwright.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(merchant) = patch.merchant {
            if let Some(base_url) = merchant.base_url {
                self.merchant.base_url = base_url;
            }
            if let Some(api_key) = merchant.api_key {
                self.merchant.api_key = Some(api_key.into());
            }
            if let Some(timeout_secs) = merchant.timeout_secs {
                self.merchant.timeout_secs = timeout_secs;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(name) = agent.name {
                self.agent.name = name;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("CARTWRIGHT_MERCHANT_URL") {
            self.merchant.base_url = url;
        }
        if let Ok(api_key) = env::var("CARTWRIGHT_MERCHANT_API_KEY") {
            self.merchant.api_key = Some(api_key.into());
        }
        if let Ok(raw) = env::var("CARTWRIGHT_MERCHANT_TIMEOUT_SECS") {
            self.merchant.timeout_secs = raw.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "CARTWRIGHT_MERCHANT_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                }
            })?;
        }
        if let Ok(name) = env::var("CARTWRIGHT_AGENT_NAME") {
            self.agent.name = name;
        }
        if let Ok(level) = env::var("CARTWRIGHT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(raw) = env::var("CARTWRIGHT_LOG_FORMAT") {
            self.logging.format = raw.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "CARTWRIGHT_LOG_FORMAT".to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.merchant_url {
            self.merchant.base_url = url;
        }
        if let Some(api_key) = overrides.merchant_api_key {
            self.merchant.api_key = Some(api_key.into());
        }
        if let Some(timeout_secs) = overrides.merchant_timeout_secs {
            self.merchant.timeout_secs = timeout_secs;
        }
        if let Some(name) = overrides.agent_name {
            self.agent.name = name;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.merchant.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("merchant.base_url must not be empty".to_string()));
        }
        if !self.merchant.base_url.starts_with("http://")
            && !self.merchant.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "merchant.base_url must be an http(s) URL, got `{}`",
                self.merchant.base_url
            )));
        }
        if self.merchant.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "merchant.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::Validation("agent.name must not be empty".to_string()));
        }
        Ok(())
    }
}

fn resolve_config_path(requested: Option<&Path>) -> Option<PathBuf> {
    match requested {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(_) => None,
        None => {
            let default = Path::new("cartwright.toml");
            default.exists().then(|| default.to_path_buf())
        }
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}
