//! Grants.gov search adapter: keyword search and opportunity-number autofill.

mod client;
mod mapping;

pub use client::GrantsGovClient;
pub use mapping::{AutofillGrant, SearchResult, SearchResults, normalize_close_date};

/// Settings key holding the Grants.gov subscription key.
pub const API_KEY_SETTING: &str = "grants_gov_api_key";

/// Header carrying the subscription key on keyword search.
pub const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub const DEFAULT_SEARCH_ROWS: u32 = 25;

pub const MAX_SEARCH_ROWS: u32 = 1000;

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;
