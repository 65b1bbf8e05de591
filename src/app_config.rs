/*!
 * Application configuration.
 *
 * Handles loading the JSON config file, environment overrides and the
 * conversion into the immutable `ServiceConfig` the translation service
 * is built from.
 */

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::TranslationError;

/// Translation backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    // @backend: OpenAI chat completions
    #[default]
    OpenAI,
    // @backend: OpenRouter gateway (OpenAI-compatible)
    OpenRouter,
    // @backend: Google AI (Gemini) generateContent
    GoogleAI,
    // @backend: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl Backend {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::GoogleAI => "Google AI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::OpenRouter => "openrouter".to_string(),
            Self::GoogleAI => "googleai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Endpoint used when the configuration leaves `base_url` empty
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::GoogleAI => "https://generativelanguage.googleapis.com/v1beta",
            Self::LMStudio => "http://localhost:1234/v1",
        }
    }

    /// Local servers accept requests without a credential
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::LMStudio)
    }

    /// Prefix of the environment variables for this backend
    fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::OpenRouter => "OPENROUTER",
            Self::GoogleAI => "GOOGLE_AI",
            Self::LMStudio => "LMSTUDIO",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "googleai" | "google" | "gemini" => Ok(Self::GoogleAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid backend: {}", s)),
        }
    }
}

/// Immutable settings the translation service is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Selected backend
    pub backend: Backend,
    /// API credential (may be empty for LM Studio)
    pub api_key: String,
    /// Endpoint override; `None` uses the backend default
    pub base_url: Option<String>,
    /// Model identifier
    pub model: String,
    /// Requests per minute ceiling, 0 disables pacing
    pub rpm: u32,
    /// Log per-unit translations and provider diagnostics
    pub verbose: bool,
    /// Maximum units per request
    pub batch_size: usize,
    /// HTTP timeout for a single request
    pub timeout_secs: u64,
}

/// Maximum number of subtitles sent in one request
pub const DEFAULT_BATCH_SIZE: usize = 20;

impl ServiceConfig {
    /// Create a config with defaults for everything but the essentials
    pub fn new(backend: Backend, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            base_url: None,
            model: model.into(),
            rpm: 0,
            verbose: false,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_rpm(mut self, rpm: u32) -> Self {
        self.rpm = rpm;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Endpoint to talk to, falling back to the backend default
    pub fn endpoint(&self) -> String {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => self.backend.default_base_url().to_string(),
        }
    }

    /// Check everything that cannot be fixed by retrying
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.backend.requires_api_key() && self.api_key.trim().is_empty() {
            return Err(TranslationError::Configuration(format!(
                "API key is required for {} backend",
                self.backend
            )));
        }
        if self.model.trim().is_empty() {
            return Err(TranslationError::Configuration(format!(
                "model must be specified for {} backend",
                self.backend.display_name()
            )));
        }
        if self.batch_size == 0 {
            return Err(TranslationError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.endpoint()).map_err(|e| {
            TranslationError::Configuration(format!("invalid base URL '{}': {}", self.endpoint(), e))
        })?;
        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Represents the on-disk configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Translation backend
    #[serde(default)]
    pub backend: Backend,

    /// Model name
    #[serde(default = "String::new")]
    pub model: String,

    /// API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL override
    #[serde(default = "String::new")]
    pub base_url: String,

    /// Requests per minute, 0 for unlimited
    #[serde(default)]
    pub rpm: u32,

    /// Units per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            model: String::new(),
            api_key: String::new(),
            base_url: String::new(),
            rpm: 0,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Candidate config files, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("srtran.json"), PathBuf::from(".srtran.json")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("srtran").join("config.json"));
            paths.push(home.join(".srtran.json"));
        }
        paths
    }

    /// Read a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration the way the CLI does: explicit file, else the
    /// first default path that exists, then environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let mut loaded_from = None;
        let mut config = Config::default();

        if let Some(path) = explicit_path {
            config = Self::from_file(path)?;
            loaded_from = Some(path.to_path_buf());
        } else {
            for candidate in Self::default_paths() {
                if candidate.is_file() {
                    config = Self::from_file(&candidate)?;
                    loaded_from = Some(candidate);
                    break;
                }
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok((config, loaded_from))
    }

    /// Apply provider environment variables using the given lookup.
    ///
    /// The first backend whose `<PREFIX>_API_KEY` is set wins, in the order
    /// Google AI, OpenRouter, OpenAI, LM Studio.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for backend in [Backend::GoogleAI, Backend::OpenRouter, Backend::OpenAI, Backend::LMStudio] {
            let prefix = backend.env_prefix();
            let Some(api_key) = non_empty(&format!("{prefix}_API_KEY")) else {
                continue;
            };

            self.backend = backend;
            self.api_key = api_key;
            if let Some(model) = non_empty(&format!("{prefix}_MODEL")) {
                self.model = model;
            }
            if let Some(rpm) = non_empty(&format!("{prefix}_RPM")).and_then(|v| v.trim().parse().ok()) {
                self.rpm = rpm;
            }
            if backend == Backend::LMStudio {
                if let Some(base_url) = non_empty("LMSTUDIO_BASE_URL") {
                    self.base_url = base_url;
                }
            }
            break;
        }
    }

    /// Build the immutable service configuration
    pub fn service_config(&self, verbose: bool) -> ServiceConfig {
        ServiceConfig {
            backend: self.backend,
            api_key: self.api_key.clone(),
            base_url: if self.base_url.trim().is_empty() {
                None
            } else {
                Some(self.base_url.clone())
            },
            model: self.model.clone(),
            rpm: self.rpm,
            verbose,
            batch_size: self.batch_size,
            timeout_secs: self.timeout_secs,
        }
    }
}
