//! Configuration loading and data root resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Server settings, loaded from the `[server]` table of the config file
/// with compiled defaults for every field
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// External message backend to relay sends to; canned-responder mode
    /// when absent
    pub relay_url: Option<String>,
    /// Timeout applied to every outbound HTTP request, in seconds
    pub request_timeout_secs: u64,
    /// Age after which an untouched guest session directory is deleted
    pub guest_ttl_secs: u64,
    /// How often the guest sweeper runs
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5870".to_string(),
            relay_url: None,
            request_timeout_secs: 10,
            guest_ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 60 * 60,
        }
    }
}

impl ServerConfig {
    /// Load from the platform config file, falling back to defaults when
    /// the file or the `[server]` table is absent
    pub fn load() -> Self {
        let Ok(path) = locate_config_file() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => file.server,
            Err(e) => {
                tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    data_root: Option<String>,
}

/// Data root resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`data_root` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(file) = toml::from_str::<ConfigFile>(&content) {
                if let Some(root) = file.data_root {
                    return PathBuf::from(root);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_root()
}

/// Find the platform config file, if one exists
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lux").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lux/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data root
fn default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lux"))
        .unwrap_or_else(|| PathBuf::from("./lux_data"))
}
