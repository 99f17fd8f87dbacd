use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Grants.gov upstream configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GrantsGovConfig {
    /// Upstream API origin.
    /// TOML: `grants_gov.base_url`. Default: `https://api.grants.gov`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Path of the `search2` endpoint, used by both search modes.
    /// TOML: `grants_gov.search_path`. Default: `/v1/api/search2`.
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Prefix of the public opportunity detail page; the opportunity id is appended.
    /// TOML: `grants_gov.detail_url_base`.
    #[serde(default = "default_detail_url_base")]
    pub detail_url_base: String,

    /// Whole-request timeout for keyword search, in seconds.
    /// TOML: `grants_gov.search_timeout_secs`. Default: `15`.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Whole-request timeout for opportunity-number lookup, in seconds.
    /// TOML: `grants_gov.lookup_timeout_secs`. Default: `10`.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    /// TOML: `grants_gov.connect_timeout_secs`. Default: `5`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent sent upstream; Grants.gov rejects some non-browser agents.
    /// TOML: `grants_gov.user_agent`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional upstream HTTP proxy.
    /// TOML: `grants_gov.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl GrantsGovConfig {
    pub fn search_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&self.search_path);
        url.set_query(None);
        url
    }

    pub fn detail_url(&self, opportunity_id: &str) -> String {
        format!(
            "{}/{}",
            self.detail_url_base.trim_end_matches('/'),
            opportunity_id
        )
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for GrantsGovConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            detail_url_base: default_detail_url_base(),
            search_timeout_secs: default_search_timeout_secs(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.grants.gov").expect("default grants.gov url must be valid")
}

fn default_search_path() -> String {
    "/v1/api/search2".to_string()
}

fn default_detail_url_base() -> String {
    "https://www.grants.gov/search-results-detail".to_string()
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
