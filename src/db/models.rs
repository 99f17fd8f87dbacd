use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

pub const STATUS_TRACKING: &str = "tracking";
pub const STATUS_APPLIED: &str = "applied";
pub const STATUS_AWARDED: &str = "awarded";

/// Row as stored; `tags` is JSON text.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbGrant {
    pub id: i64,
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
    pub tags: Option<Json<Vec<String>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked funding opportunity as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbGrant> for Grant {
    fn from(row: DbGrant) -> Self {
        Self {
            id: row.id,
            title: row.title,
            agency: row.agency,
            opportunity_number: row.opportunity_number,
            opportunity_id: row.opportunity_id,
            description: row.description,
            funding_amount: row.funding_amount,
            deadline: row.deadline,
            renewal_date: row.renewal_date,
            status: row.status,
            category: row.category,
            eligibility: row.eligibility,
            award_ceiling: row.award_ceiling,
            award_floor: row.award_floor,
            expected_awards: row.expected_awards,
            application_url: row.application_url,
            notes: row.notes,
            tags: row.tags.map(|Json(tags)| tags).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Summary metrics for the tracker home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total: i64,
    pub active: i64,
    pub applied: i64,
    pub awarded: i64,
    pub due_this_week: i64,
    pub due_this_month: i64,
    pub total_funding_awarded: f64,
    pub upcoming_deadlines: Vec<Grant>,
}
