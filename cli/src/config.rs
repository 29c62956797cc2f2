//! CLI configuration with TOML file support.
//!
//! File values are the base; command-line flags and `X1C_*` environment
//! variables override them. Protocol constants (supply, split, lock and
//! staking periods) are fixed and not configurable here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use x1c_token::GenesisConfig;
use x1c_types::{Address, Timestamp};

use crate::CliError;

/// Deployment roles and logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Deployer; receives the public allocation.
    #[serde(default = "default_issuer")]
    pub issuer: Address,

    /// Owner of the locked team allocation.
    #[serde(default = "default_team")]
    pub team: Address,

    /// Receives the community allocation.
    #[serde(default = "default_community")]
    pub community: Address,

    /// Construction time in Unix seconds; the current time when unset.
    #[serde(default)]
    pub genesis_time: Option<u64>,

    /// Log output format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,x1c_token=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_issuer() -> Address {
    Address::from_low_u64(1)
}

fn default_team() -> Address {
    Address::from_low_u64(2)
}

fn default_community() -> Address {
    Address::from_low_u64(3)
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Genesis roles, starting at the configured time or `now`.
    pub fn genesis(&self, now: Timestamp) -> GenesisConfig {
        GenesisConfig {
            issuer: self.issuer,
            team: self.team,
            community: self.community,
            genesis_time: self.genesis_time.map(Timestamp::new).unwrap_or(now),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            team: default_team(),
            community: default_community(),
            genesis_time: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
