use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxaError};

/// Environment variable overriding `remote.base_url`.
pub const ENV_API_URL: &str = "VOXA_API_URL";
/// Environment variable overriding `remote.api_key`.
pub const ENV_API_KEY: &str = "VOXA_API_KEY";
/// Environment variable overriding `wake_word.access_key`.
pub const ENV_WAKE_WORD_KEY: &str = "VOXA_WAKE_WORD_KEY";

/// Top-level configuration for the Voxa client.
///
/// Loaded from `~/.voxa/config.toml` by default. Each section corresponds
/// to one collaborator of the conversation orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub wake_word: WakeWordConfig,
}

impl VoxaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxaConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a configured value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.remote.base_url = url;
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.remote.api_key = Some(key);
        }
        if let Some(key) = non_empty(ENV_WAKE_WORD_KEY) {
            self.wake_word.access_key = Some(key);
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote assistant backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the assistant API, without trailing slash.
    pub base_url: String,
    /// Bound applied to every request, in seconds.
    pub timeout_secs: u64,
    /// Optional bearer token sent with every request.
    pub api_key: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Turn-taking and speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Re-arm speech input after each spoken response.
    pub auto_listen: bool,
    /// Pause between speech completion and re-arming input, in milliseconds.
    pub settle_delay_ms: u64,
    /// Pause before retrying after a recognition error, in milliseconds.
    pub error_retry_delay_ms: u64,
    /// Number of prior history entries forwarded with each chat request.
    pub history_window: usize,
    /// BCP 47 locale handed to the speech engines.
    pub locale: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            auto_listen: true,
            settle_delay_ms: 800,
            error_retry_delay_ms: 1500,
            history_window: 10,
            locale: "pt-BR".to_string(),
        }
    }
}

impl VoiceConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_millis(self.error_retry_delay_ms)
    }
}

/// Wake-word engine settings. The engine itself is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeWordConfig {
    pub enabled: bool,
    pub keyword: String,
    /// Opaque access key for the wake-word engine.
    pub access_key: Option<String>,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keyword: "voxa".to_string(),
            access_key: None,
        }
    }
}
