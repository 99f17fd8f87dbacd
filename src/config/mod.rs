mod basic;
mod grants_gov;

pub use basic::BasicConfig;
pub use grants_gov::GrantsGovConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Grants.gov upstream settings (see `grants_gov` table in config.toml).
    #[serde(default)]
    pub grants_gov: GrantsGovConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "GRANTDESK_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `GRANTDESK_`-prefixed environment variables (`__` separates tables,
    /// e.g. `GRANTDESK_BASIC__LISTEN_PORT=9000`).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration by merging defaults, `config.toml` if present, and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
