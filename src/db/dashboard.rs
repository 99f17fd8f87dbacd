//! Dashboard aggregation over the `grants` table.

use chrono::{Days, NaiveDate};
use sqlx::SqliteConnection;

use super::models::{DbGrant, Dashboard, STATUS_APPLIED, STATUS_AWARDED, STATUS_TRACKING};
use super::schema::GRANT_COLUMNS;

pub const UPCOMING_LIMIT: i64 = 10;

/// Inclusive date windows evaluated against a fixed `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineWindows {
    pub today: NaiveDate,
    pub week_end: NaiveDate,
    pub month_end: NaiveDate,
}

impl DeadlineWindows {
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            today,
            week_end: today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX),
            month_end: today.checked_add_days(Days::new(30)).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Runs every dashboard query on one connection. Callers pass a transaction
/// so the counts and the upcoming list see the same snapshot.
pub(crate) async fn load_dashboard(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> Result<Dashboard, sqlx::Error> {
    let windows = DeadlineWindows::starting(today);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grants")
        .fetch_one(&mut *conn)
        .await?;
    let active = count_with_status(conn, STATUS_TRACKING).await?;
    let applied = count_with_status(conn, STATUS_APPLIED).await?;
    let awarded = count_with_status(conn, STATUS_AWARDED).await?;
    let due_this_week = count_open_due_between(conn, windows.today, windows.week_end).await?;
    let due_this_month = count_open_due_between(conn, windows.today, windows.month_end).await?;

    // TOTAL() is SUM() that yields 0.0 instead of NULL on no rows.
    let total_funding_awarded: f64 =
        sqlx::query_scalar("SELECT TOTAL(funding_amount) FROM grants WHERE status = ?")
            .bind(STATUS_AWARDED)
            .fetch_one(&mut *conn)
            .await?;

    let upcoming_deadlines = sqlx::query_as::<_, DbGrant>(&format!(
        r#"
        SELECT {GRANT_COLUMNS}
        FROM grants
        WHERE deadline >= ? AND status IN (?, ?)
        ORDER BY deadline ASC, id ASC
        LIMIT ?
        "#
    ))
    .bind(windows.today)
    .bind(STATUS_TRACKING)
    .bind(STATUS_APPLIED)
    .bind(UPCOMING_LIMIT)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Into::into)
    .collect();

    Ok(Dashboard {
        total,
        active,
        applied,
        awarded,
        due_this_week,
        due_this_month,
        total_funding_awarded,
        upcoming_deadlines,
    })
}

async fn count_with_status(conn: &mut SqliteConnection, status: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM grants WHERE status = ?")
        .bind(status)
        .fetch_one(&mut *conn)
        .await
}

async fn count_open_due_between(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM grants
        WHERE deadline >= ? AND deadline <= ? AND status IN (?, ?)
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(STATUS_TRACKING)
    .bind(STATUS_APPLIED)
    .fetch_one(&mut *conn)
    .await
}
