//! CLI argument definitions for the Voxa binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;
use voxa_core::VoxaConfig;

/// Environment variable naming the config file.
pub const ENV_CONFIG: &str = "VOXA_CONFIG";

/// Voxa - a voice-first personal assistant client.
#[derive(Parser, Debug)]
#[command(name = "voxa", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the assistant API.
    #[arg(short = 'u', long = "api-url")]
    pub api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Do not re-arm listening after each reply.
    #[arg(long = "no-auto-listen")]
    pub no_auto_listen: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOXA_CONFIG env var > ~/.voxa/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Apply flag overrides on top of the file and environment.
    pub fn apply_to(&self, config: &mut VoxaConfig) {
        if let Some(ref url) = self.api_url {
            config.remote.base_url = url.clone();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if self.no_auto_listen {
            config.voice.auto_listen = false;
        }
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voxa").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxa").join("config.toml");
    }
    PathBuf::from("config.toml")
}
