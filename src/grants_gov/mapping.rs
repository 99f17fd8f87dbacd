use grantdesk_schema::OpportunityHit;
use serde::{Deserialize, Serialize};

use crate::config::GrantsGovConfig;

/// A keyword-search hit reshaped into the local grant fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub agency: String,
    pub opportunity_number: String,
    pub opportunity_id: String,
    pub description: String,
    pub deadline: String,
    pub award_ceiling: Option<f64>,
    pub award_floor: Option<f64>,
    pub expected_awards: Option<i64>,
    pub category: String,
    pub application_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchResult>,
    pub total: usize,
}

/// Minimal shape used to pre-fill the add-grant form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutofillGrant {
    pub opportunity_number: String,
    pub title: Option<String>,
    pub agency: Option<String>,
    pub deadline: Option<String>,
}

impl SearchResult {
    pub fn from_hit(hit: &OpportunityHit, cfg: &GrantsGovConfig) -> Self {
        let opportunity_id = hit.id_string();
        Self {
            title: hit.title.clone().unwrap_or_default(),
            agency: hit.agency_name.clone().unwrap_or_default(),
            opportunity_number: hit.number.clone().unwrap_or_default(),
            application_url: cfg.detail_url(&opportunity_id),
            opportunity_id,
            description: hit.synopsis.clone().unwrap_or_default(),
            deadline: hit.close_date.clone().unwrap_or_default(),
            award_ceiling: hit.award_ceiling,
            award_floor: hit.award_floor,
            expected_awards: hit.expected_number_of_awards,
            category: hit
                .category_description()
                .map(str::to_string)
                .unwrap_or_default(),
        }
    }
}

impl SearchResults {
    pub fn from_hits(hits: &[OpportunityHit], cfg: &GrantsGovConfig) -> Self {
        let results: Vec<SearchResult> = hits
            .iter()
            .map(|hit| SearchResult::from_hit(hit, cfg))
            .collect();
        Self {
            total: results.len(),
            results,
        }
    }
}

impl AutofillGrant {
    /// Field fallbacks: `title` then `opportunityTitle`; `agencyName` then
    /// `agency`; the upstream number then the number that was asked for.
    pub fn from_hit(hit: &OpportunityHit, requested_number: &str) -> Self {
        Self {
            opportunity_number: first_non_empty([hit.opp_num.as_deref(), hit.number.as_deref()])
                .unwrap_or_else(|| requested_number.to_string()),
            title: first_non_empty([hit.title.as_deref(), hit.opportunity_title.as_deref()]),
            agency: first_non_empty([hit.agency_name.as_deref(), hit.agency.as_deref()]),
            deadline: first_non_empty([hit.close_date.as_deref()])
                .map(|d| normalize_close_date(&d)),
        }
    }
}

/// Drops a time-of-day suffix: `"2025-12-01 17:00:00"` becomes `"2025-12-01"`.
pub fn normalize_close_date(raw: &str) -> String {
    match raw.split_once(' ') {
        Some((date, _)) => date.to_string(),
        None => raw.to_string(),
    }
}

fn first_non_empty<const N: usize>(candidates: [Option<&str>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
