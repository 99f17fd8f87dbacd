//! SQL DDL for initializing the database schema.
//! Every statement is idempotent and runs on each start.

/// SQLite schema includes:
/// - `grants` table (one tracked opportunity per row, unique opportunity number)
/// - `settings` table (process-wide key/value pairs such as the Grants.gov API key)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Grants
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS grants (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    agency TEXT NULL,
    opportunity_number TEXT NULL UNIQUE,
    opportunity_id TEXT NULL,
    description TEXT NULL,
    funding_amount REAL NULL,
    deadline TEXT NULL, -- YYYY-MM-DD
    renewal_date TEXT NULL, -- YYYY-MM-DD
    status TEXT NOT NULL DEFAULT 'tracking',
    category TEXT NULL,
    eligibility TEXT NULL,
    award_ceiling REAL NULL,
    award_floor REAL NULL,
    expected_awards INTEGER NULL,
    application_url TEXT NULL,
    notes TEXT NULL,
    tags TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_grants_status ON grants(status);
CREATE INDEX IF NOT EXISTS idx_grants_deadline ON grants(deadline);

-- ---------------------------------------------------------------------------
-- Settings
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Column list shared by every grant read path.
pub(crate) const GRANT_COLUMNS: &str = "id, title, agency, opportunity_number, opportunity_id, \
    description, funding_amount, deadline, renewal_date, status, category, eligibility, \
    award_ceiling, award_floor, expected_awards, application_url, notes, tags, created_at, updated_at";
