use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::providers::ProviderKind;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openrouter/auto";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Runtime configuration for the tutor service.
///
/// Values are layered: built-in defaults, then an optional YAML file, then
/// environment variables (a `.env` file is honoured).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub provider: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(with = "duration_serde")]
    pub min_delay: Duration,
    pub max_attempts: u32,
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    pub referer: String,
    pub app_title: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: None,
            provider: "openrouter".to_string(),
            openrouter_api_key: None,
            openrouter_api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.6,
            max_tokens: 200,
            min_delay: Duration::from_secs(10),
            max_attempts: 3,
            request_timeout: Duration::from_secs(30),
            referer: "https://your-tutorbot.app".to_string(),
            app_title: "AI TutorBot".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load the config from `path` (or the default location if it exists),
    /// then apply environment overrides and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same layering as `load`, without validation. Callers that apply further
    /// overrides (command-line flags) validate once they are done.
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => match get_config_file_path() {
                Some(default_path) if default_path.exists() => {
                    Self::from_yaml_file(&default_path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_env_from(|key| env::var(key).ok())?;

        Ok(config)
    }

    /// Read a YAML config file. Fields missing from the file keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str::<Config>(&yaml)?)
    }

    /// Apply overrides from a key lookup. `load` passes the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TUTORBOT_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("TUTORBOT_PORT") {
            self.port = parse_value("TUTORBOT_PORT", &port)?;
        }
        if let Some(workers) = lookup("TUTORBOT_WORKERS") {
            self.workers = Some(parse_value("TUTORBOT_WORKERS", &workers)?);
        }
        if let Some(provider) = lookup("TUTORBOT_PROVIDER") {
            self.provider = provider;
        }
        if let Some(api_key) = lookup("OPENROUTER_API_KEY") {
            // An empty key is treated the same as an unset one.
            self.openrouter_api_key = Some(api_key).filter(|k| !k.trim().is_empty());
        }
        if let Some(api_url) = lookup("OPENROUTER_API_URL") {
            self.openrouter_api_url = api_url;
        }
        if let Some(model) = lookup("TUTORBOT_MODEL") {
            self.model = model;
        }
        if let Some(temperature) = lookup("TUTORBOT_TEMPERATURE") {
            self.temperature = parse_value("TUTORBOT_TEMPERATURE", &temperature)?;
        }
        if let Some(max_tokens) = lookup("TUTORBOT_MAX_TOKENS") {
            self.max_tokens = parse_value("TUTORBOT_MAX_TOKENS", &max_tokens)?;
        }
        if let Some(min_delay) = lookup("TUTORBOT_MIN_DELAY") {
            self.min_delay = parse_duration(&min_delay)
                .ok_or_else(|| invalid("TUTORBOT_MIN_DELAY", &min_delay))?;
        }
        if let Some(max_attempts) = lookup("TUTORBOT_MAX_ATTEMPTS") {
            self.max_attempts = parse_value("TUTORBOT_MAX_ATTEMPTS", &max_attempts)?;
        }
        if let Some(timeout) = lookup("TUTORBOT_REQUEST_TIMEOUT") {
            self.request_timeout = parse_duration(&timeout)
                .ok_or_else(|| invalid("TUTORBOT_REQUEST_TIMEOUT", &timeout))?;
        }
        if let Some(referer) = lookup("TUTORBOT_REFERER") {
            self.referer = referer;
        }
        if let Some(title) = lookup("TUTORBOT_TITLE") {
            self.app_title = title;
        }
        if let Some(origins) = lookup("TUTORBOT_CORS_ORIGINS") {
            self.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = level;
        }
        if let Some(format) = lookup("TUTORBOT_LOG_FORMAT") {
            self.log_format = format
                .parse()
                .map_err(|_| invalid("TUTORBOT_LOG_FORMAT", &format))?;
        }

        Ok(())
    }

    /// Apply `serve` flags; they take precedence over file and environment.
    pub fn apply_serve_overrides(
        &mut self,
        host: Option<String>,
        port: Option<u16>,
        workers: Option<usize>,
    ) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if workers.is_some() {
            self.workers = workers;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if self.openrouter_api_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "openrouter_api_url must not be empty".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Validation(
                "workers must be at least 1 when set".to_string(),
            ));
        }
        self.provider
            .parse::<ProviderKind>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(())
    }

    /// A copy that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.openrouter_api_key.is_some() {
            config.openrouter_api_key = Some("<redacted>".to_string());
        }
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `~/.tutorbot/config.yaml`, if a home directory can be determined.
pub fn get_config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tutorbot").join("config.yaml"))
}

/// Accepts a plain number of seconds (`"2.5"`) or a humantime string (`"10s"`, `"1m 30s"`).
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<f64>() {
        // rejects negative, non-finite and out-of-range values
        return Duration::try_from_secs_f64(secs).ok();
    }
    humantime::parse_duration(value).ok()
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

mod duration_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => super::parse_duration(&secs.to_string()),
            Raw::Text(text) => super::parse_duration(&text),
        };
        parsed.ok_or_else(|| de::Error::custom("invalid duration"))
    }
}
