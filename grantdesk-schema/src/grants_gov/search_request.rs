use serde::{Deserialize, Serialize};

/// Opportunity status filter used by keyword search.
pub const POSTED_STATUS: &str = "posted";

/// Body of a `POST /v1/api/search2` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search2Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opp_num: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opp_statuses: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
}

impl Search2Request {
    /// Keyword search restricted to posted opportunities.
    ///
    /// An empty `agency` is treated as no filter.
    pub fn keyword(keyword: impl Into<String>, agency: Option<&str>, rows: u32) -> Self {
        Self {
            keyword: Some(keyword.into()),
            opp_statuses: Some(POSTED_STATUS.to_string()),
            rows: Some(rows),
            agency: agency
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            ..Default::default()
        }
    }

    /// Exact lookup by opportunity number.
    pub fn opportunity_number(number: impl Into<String>) -> Self {
        Self {
            opp_num: Some(number.into()),
            ..Default::default()
        }
    }
}
