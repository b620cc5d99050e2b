//! Configuration for echoid.
//!
//! Loaded from `~/.config/echoid/echoid.toml` when present, defaults
//! otherwise. The only environment surface is the endpoint URL and the
//! capture duration (`ECHOID_ENDPOINT`, `ECHOID_CAPTURE_SECS`).

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoIdConfig {
    /// Recognition endpoint URL the finalized sample is POSTed to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Recording window in seconds. Deployments have shipped with 10 or 15;
    /// this is configuration, not a constant of the design.
    #[serde(default = "default_capture_secs")]
    pub capture_secs: u64,
    /// Audio input device: "default", a device name, or a numeric index.
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_endpoint() -> String {
    "https://echoid-backend-ad59.onrender.com/identify".to_string()
}

fn default_capture_secs() -> u64 {
    15
}

fn default_device() -> String {
    "default".to_string()
}

impl Default for EchoIdConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            capture_secs: default_capture_secs(),
            device: default_device(),
        }
    }
}

impl EchoIdConfig {
    /// Loads configuration: file if present, then env overrides.
    ///
    /// # Errors
    /// - If an existing config file cannot be read or parsed
    /// - If `ECHOID_CAPTURE_SECS` is set but not a positive integer
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Ok(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("malformed config at {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(endpoint) = std::env::var("ECHOID_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(secs) = std::env::var("ECHOID_CAPTURE_SECS") {
            config.capture_secs = secs
                .parse()
                .map_err(|e| anyhow!("invalid ECHOID_CAPTURE_SECS '{secs}': {e}"))?;
        }
        if config.capture_secs == 0 {
            return Err(anyhow!("capture_secs must be positive"));
        }

        Ok(config)
    }

    pub fn capture_duration(&self) -> Duration {
        Duration::from_secs(self.capture_secs)
    }
}

fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not find home directory"))?;
    Ok(home.join(".config").join("echoid").join("echoid.toml"))
}
