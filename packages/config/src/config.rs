// ABOUTME: Runtime configuration loaded from environment variables
// ABOUTME: Host version parsing and control type policy selection

use std::cmp::Ordering;
use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    CUSTOMIZER_HOST_VERSION, CUSTOMIZER_LEGACY_CONTROL_TYPES, CUSTOMIZER_STYLESHEET,
    DEFAULT_STYLESHEET, MIN_MODERN_HOST_VERSION,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid boolean for {var}: {value}. Must be 'true' or 'false'")]
    InvalidBool { var: &'static str, value: String },
    #[error("Invalid host version: {0}")]
    InvalidHostVersion(String),
}

/// How declared control types are treated at registration time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTypePolicy {
    /// Types are stored as declared
    #[default]
    Modern,
    /// Types unknown to pre-4.0 hosts are coerced to plain text
    Legacy,
}

/// Dotted numeric version of the host framework, e.g. `3.9.2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersion {
    parts: Vec<u32>,
}

impl HostVersion {
    pub fn new(parts: Vec<u32>) -> Self {
        Self { parts }
    }

    fn part(&self, idx: usize) -> u32 {
        self.parts.get(idx).copied().unwrap_or(0)
    }

    /// Whether this host predates full control type support
    pub fn is_legacy(&self) -> bool {
        let (major, minor) = MIN_MODERN_HOST_VERSION;
        self.cmp(&HostVersion::new(vec![major, minor])) == Ordering::Less
    }
}

impl Ord for HostVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.part(i).cmp(&other.part(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for HostVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for HostVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Pre-release suffixes like "-beta1" or "-RC2" do not take part in comparison
        let numeric = s.trim().split(['-', '+', ' ']).next().unwrap_or_default();

        let parts = numeric
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::InvalidHostVersion(s.to_string()))?;

        if parts.is_empty() {
            return Err(ConfigError::InvalidHostVersion(s.to_string()));
        }

        Ok(HostVersion { parts })
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", joined.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomizerConfig {
    pub host_version: Option<HostVersion>,
    pub legacy_control_types: Option<bool>,
    pub stylesheet: String,
}

impl Default for CustomizerConfig {
    fn default() -> Self {
        Self {
            host_version: None,
            legacy_control_types: None,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

impl CustomizerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_version = lookup(CUSTOMIZER_HOST_VERSION)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<HostVersion>())
            .transpose()?;

        let legacy_control_types = lookup(CUSTOMIZER_LEGACY_CONTROL_TYPES)
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_bool(CUSTOMIZER_LEGACY_CONTROL_TYPES, &v))
            .transpose()?;

        let stylesheet = lookup(CUSTOMIZER_STYLESHEET)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

        let config = CustomizerConfig {
            host_version,
            legacy_control_types,
            stylesheet,
        };
        debug!(policy = ?config.control_type_policy(), "Loaded customizer configuration");

        Ok(config)
    }

    /// Resolve the control type policy. An explicit flag wins over version inference.
    pub fn control_type_policy(&self) -> ControlTypePolicy {
        let legacy = match (self.legacy_control_types, &self.host_version) {
            (Some(flag), _) => flag,
            (None, Some(version)) => version.is_legacy(),
            (None, None) => false,
        };

        if legacy {
            ControlTypePolicy::Legacy
        } else {
            ControlTypePolicy::Modern
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
