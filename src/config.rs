// ABOUTME: Configuration loading for contractguard.
// ABOUTME: Reads ~/.contractguard/config.toml with per-section defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::policy::{DEFAULT_EXEMPT_PREFIXES, SignatureMatching};
use crate::session::{CacheLimits, DEFAULT_ADDRESS_CAPACITY, DEFAULT_METHOD_ARGS_CAPACITY};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: PolicyConfig,
    pub session: SessionConfig,
}

/// Allow-list policy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub exempt_prefixes: Vec<String>,
    pub signature_matching: SignatureMatching,
    /// Allow-list file; falls back to `~/.contractguard/allowlist.json`.
    pub allowlist: Option<PathBuf>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            exempt_prefixes: DEFAULT_EXEMPT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            signature_matching: SignatureMatching::Lenient,
            allowlist: None,
        }
    }
}

/// Session cache limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub method_args_capacity: usize,
    pub address_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            method_args_capacity: DEFAULT_METHOD_ARGS_CAPACITY,
            address_capacity: DEFAULT_ADDRESS_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn limits(&self) -> CacheLimits {
        CacheLimits {
            method_args: self.method_args_capacity,
            addresses: self.address_capacity,
        }
    }
}

impl Config {
    /// Load config from ~/.contractguard/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Base directory for all contractguard files.
    pub fn base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".contractguard")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::base_dir().join("config.toml")
    }

    /// Directory holding one session cache per workspace.
    pub fn sessions_dir() -> PathBuf {
        Self::base_dir().join("sessions")
    }

    /// Path to the allow-list file, honoring the configured override.
    pub fn allowlist_path(&self) -> PathBuf {
        self.policy
            .allowlist
            .clone()
            .unwrap_or_else(|| Self::base_dir().join("allowlist.json"))
    }
}
