use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::models::STATUS_TRACKING;
use crate::error::GrantDeskError;

/// Grant body accepted by create and full update.
///
/// Every field is optional on the wire; absent fields are written as null,
/// except `status` (defaults to `tracking`) and `tags` (defaults to `[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantInput {
    pub title: Option<String>,
    pub agency: Option<String>,
    pub opportunity_number: Option<String>,
    pub opportunity_id: Option<String>,
    pub description: Option<String>,
    pub funding_amount: Option<f64>,
    #[serde(deserialize_with = "deserialize_date_lax")]
    pub deadline: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_date_lax")]
    pub renewal_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub eligibility: Option<String>,
    pub award_ceiling: Option<f64>,
    pub award_floor: Option<f64>,
    pub expected_awards: Option<i64>,
    pub application_url: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated, defaulted grant fields ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantFields {
    pub title: String,
    pub agency: Option<String>,
    pub opportunity_number: Option<String>,
    pub opportunity_id: Option<String>,
    pub description: Option<String>,
    pub funding_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
    pub status: String,
    pub category: Option<String>,
    pub eligibility: Option<String>,
    pub award_ceiling: Option<f64>,
    pub award_floor: Option<f64>,
    pub expected_awards: Option<i64>,
    pub application_url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl GrantInput {
    /// Applies defaults and the not-null rules.
    ///
    /// A blank opportunity number is stored as null so it never trips the
    /// unique index.
    pub fn into_fields(self) -> Result<GrantFields, GrantDeskError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GrantDeskError::Validation("title is required".to_string()))?;

        Ok(GrantFields {
            title,
            agency: self.agency,
            opportunity_number: non_blank(self.opportunity_number),
            opportunity_id: non_blank(self.opportunity_id),
            description: self.description,
            funding_amount: self.funding_amount,
            deadline: self.deadline,
            renewal_date: self.renewal_date,
            status: normalize_status(self.status),
            category: self.category,
            eligibility: self.eligibility,
            award_ceiling: self.award_ceiling,
            award_floor: self.award_floor,
            expected_awards: self.expected_awards,
            application_url: self.application_url,
            notes: self.notes,
            tags: self.tags.unwrap_or_default(),
        })
    }
}

/// Trimmed status label; blank or missing falls back to `tracking`.
pub fn normalize_status(status: Option<String>) -> String {
    status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| STATUS_TRACKING.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, RFC3339 timestamps and the
/// `MM/DD/YYYY` form Grants.gov uses for close dates. Empty strings are null.
fn deserialize_date_lax<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_date_lax(&s).map_err(serde::de::Error::custom),
        Some(_) => Err(serde::de::Error::custom("expected a date string")),
    }
}

pub(crate) fn parse_date_lax(raw: &str) -> Result<Option<NaiveDate>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .map(Some)
        .map_err(|_| format!("invalid date `{raw}`, expected YYYY-MM-DD"))
}
