use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lax;

/// Grants.gov `search2` response envelope.
///
/// The documented shape nests hits under `data.oppHits`; some deployments
/// return `oppHits` at the top level, so both are accepted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Search2Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errorcode: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Search2Data>,

    #[serde(default, rename = "oppHits", skip_serializing_if = "Option::is_none")]
    pub opp_hits: Option<Vec<OpportunityHit>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Search2Data {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opp_hits: Option<Vec<OpportunityHit>>,
}

impl Search2Response {
    /// `true` when the envelope carries a non-zero `errorcode`.
    pub fn is_error(&self) -> bool {
        self.errorcode.is_some_and(|code| code != 0)
    }

    pub fn into_hits(self) -> Vec<OpportunityHit> {
        self.data
            .and_then(|d| d.opp_hits)
            .or(self.opp_hits)
            .unwrap_or_default()
    }
}

/// One opportunity hit. Field names differ between search modes and API
/// revisions, so every field is optional and alternates are kept separately.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityHit {
    /// Numeric in the documented API, string in some payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opp_num: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<String>,

    #[serde(
        default,
        deserialize_with = "lax::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub award_ceiling: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lax::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub award_floor: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lax::i64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_number_of_awards: Option<i64>,

    /// Usually `{"category": "D", "description": "Discretionary"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opp_category: Option<Value>,
}

impl OpportunityHit {
    /// Upstream id rendered as a string; empty when absent.
    pub fn id_string(&self) -> String {
        match &self.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// `oppCategory.description` when the category is an object carrying one.
    pub fn category_description(&self) -> Option<&str> {
        self.opp_category
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|obj| obj.get("description"))
            .and_then(Value::as_str)
    }
}
