use crate::db::dashboard::load_dashboard;
use crate::db::input::GrantFields;
use crate::db::models::{Dashboard, DbGrant, Grant};
use crate::db::schema::{GRANT_COLUMNS, SQLITE_INIT};
use crate::error::GrantDeskError;
use chrono::{NaiveDate, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// List grants, optionally filtered by exact status, soonest deadline first.
    ListGrants(Option<String>, RpcReplyPort<Result<Vec<Grant>, GrantDeskError>>),

    /// Get one grant by id.
    GetGrant(i64, RpcReplyPort<Result<Grant, GrantDeskError>>),

    /// Insert a grant and return the stored row.
    CreateGrant(GrantFields, RpcReplyPort<Result<Grant, GrantDeskError>>),

    /// Replace every mutable field of a grant.
    UpdateGrant(i64, GrantFields, RpcReplyPort<Result<Grant, GrantDeskError>>),

    /// Overwrite only the status label.
    SetGrantStatus(i64, String, RpcReplyPort<Result<Grant, GrantDeskError>>),

    /// Delete a grant; missing ids are not an error.
    DeleteGrant(i64, RpcReplyPort<Result<(), GrantDeskError>>),

    /// Aggregate metrics relative to the given date.
    Dashboard(NaiveDate, RpcReplyPort<Result<Dashboard, GrantDeskError>>),

    ListSettings(RpcReplyPort<Result<BTreeMap<String, String>, GrantDeskError>>),

    GetSetting(String, RpcReplyPort<Result<Option<String>, GrantDeskError>>),

    /// Upsert every pair in one transaction.
    UpsertSettings(
        BTreeMap<String, String>,
        RpcReplyPort<Result<(), GrantDeskError>>,
    ),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn list_grants(&self, status: Option<String>) -> Result<Vec<Grant>, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::ListGrants, status).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor ListGrants RPC failed: {e}"))
        })?
    }

    pub async fn get_grant(&self, id: i64) -> Result<Grant, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::GetGrant, id)
            .map_err(|e| GrantDeskError::RactorError(format!("DbActor GetGrant RPC failed: {e}")))?
    }

    pub async fn create_grant(&self, fields: GrantFields) -> Result<Grant, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::CreateGrant, fields).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor CreateGrant RPC failed: {e}"))
        })?
    }

    pub async fn update_grant(&self, id: i64, fields: GrantFields) -> Result<Grant, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::UpdateGrant, id, fields).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor UpdateGrant RPC failed: {e}"))
        })?
    }

    pub async fn set_grant_status(&self, id: i64, status: String) -> Result<Grant, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::SetGrantStatus, id, status).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor SetGrantStatus RPC failed: {e}"))
        })?
    }

    pub async fn delete_grant(&self, id: i64) -> Result<(), GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::DeleteGrant, id).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor DeleteGrant RPC failed: {e}"))
        })?
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::Dashboard, today).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor Dashboard RPC failed: {e}"))
        })?
    }

    pub async fn list_settings(&self) -> Result<BTreeMap<String, String>, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::ListSettings).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor ListSettings RPC failed: {e}"))
        })?
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::GetSetting, key.to_string()).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor GetSetting RPC failed: {e}"))
        })?
    }

    pub async fn upsert_settings(
        &self,
        settings: BTreeMap<String, String>,
    ) -> Result<(), GrantDeskError> {
        ractor::call!(self.actor, DbActorMessage::UpsertSettings, settings).map_err(|e| {
            GrantDeskError::RactorError(format!("DbActor UpsertSettings RPC failed: {e}"))
        })?
    }

    /// Stop the actor and wait until its pool is closed and its name released.
    pub async fn shutdown(&self) -> Result<(), GrantDeskError> {
        self.actor
            .stop_and_wait(None, None)
            .await
            .map_err(|e| GrantDeskError::RactorError(format!("DbActor shutdown failed: {e}")))
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!(database_url = %database_url, "DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.pool.close().await;
        info!("DbActor stopped");
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::ListGrants(status, reply) => {
                let res = self.list_grants(&state.pool, status).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetGrant(id, reply) => {
                let res = self.get_grant(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::CreateGrant(fields, reply) => {
                let res = self.create_grant(&state.pool, fields).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpdateGrant(id, fields, reply) => {
                let res = self.update_grant(&state.pool, id, fields).await;
                let _ = reply.send(res);
            }
            DbActorMessage::SetGrantStatus(id, status, reply) => {
                let res = self.set_grant_status(&state.pool, id, status).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteGrant(id, reply) => {
                let res = self.delete_grant(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Dashboard(today, reply) => {
                let res = self.dashboard(&state.pool, today).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListSettings(reply) => {
                let res = self.list_settings(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetSetting(key, reply) => {
                let res = self.get_setting(&state.pool, &key).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpsertSettings(settings, reply) => {
                let res = self.upsert_settings(&state.pool, settings).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn list_grants(
        &self,
        pool: &SqlitePool,
        status: Option<String>,
    ) -> Result<Vec<Grant>, GrantDeskError> {
        // Grants without a deadline sort last.
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, DbGrant>(&format!(
                    r#"
                SELECT {GRANT_COLUMNS}
                FROM grants
                WHERE status = ?
                ORDER BY deadline IS NULL, deadline ASC, id ASC
                "#
                ))
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbGrant>(&format!(
                    r#"
                SELECT {GRANT_COLUMNS}
                FROM grants
                ORDER BY deadline IS NULL, deadline ASC, id ASC
                "#
                ))
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Grant::from).collect())
    }

    async fn get_grant(&self, pool: &SqlitePool, id: i64) -> Result<Grant, GrantDeskError> {
        let row = sqlx::query_as::<_, DbGrant>(&format!(
            "SELECT {GRANT_COLUMNS} FROM grants WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Grant::from).ok_or_else(|| grant_not_found(id))
    }

    async fn create_grant(
        &self,
        pool: &SqlitePool,
        f: GrantFields,
    ) -> Result<Grant, GrantDeskError> {
        let now = Utc::now();
        let opportunity_number = f.opportunity_number.clone();

        let row = sqlx::query_as::<_, DbGrant>(&format!(
            r#"
            INSERT INTO grants (
                title, agency, opportunity_number, opportunity_id, description,
                funding_amount, deadline, renewal_date, status, category, eligibility,
                award_ceiling, award_floor, expected_awards, application_url, notes, tags,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {GRANT_COLUMNS}
            "#
        ))
        .bind(f.title)
        .bind(f.agency)
        .bind(f.opportunity_number)
        .bind(f.opportunity_id)
        .bind(f.description)
        .bind(f.funding_amount)
        .bind(f.deadline)
        .bind(f.renewal_date)
        .bind(f.status)
        .bind(f.category)
        .bind(f.eligibility)
        .bind(f.award_ceiling)
        .bind(f.award_floor)
        .bind(f.expected_awards)
        .bind(f.application_url)
        .bind(f.notes)
        .bind(Json(f.tags))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, opportunity_number.as_deref()))?;

        debug!(grant.id = row.id, "Grant created");
        Ok(row.into())
    }

    async fn update_grant(
        &self,
        pool: &SqlitePool,
        id: i64,
        f: GrantFields,
    ) -> Result<Grant, GrantDeskError> {
        let now = Utc::now();
        let opportunity_number = f.opportunity_number.clone();

        let row = sqlx::query_as::<_, DbGrant>(&format!(
            r#"
            UPDATE grants SET
                title = ?, agency = ?, opportunity_number = ?, opportunity_id = ?,
                description = ?, funding_amount = ?, deadline = ?, renewal_date = ?,
                status = ?, category = ?, eligibility = ?, award_ceiling = ?,
                award_floor = ?, expected_awards = ?, application_url = ?, notes = ?,
                tags = ?, updated_at = ?
            WHERE id = ?
            RETURNING {GRANT_COLUMNS}
            "#
        ))
        .bind(f.title)
        .bind(f.agency)
        .bind(f.opportunity_number)
        .bind(f.opportunity_id)
        .bind(f.description)
        .bind(f.funding_amount)
        .bind(f.deadline)
        .bind(f.renewal_date)
        .bind(f.status)
        .bind(f.category)
        .bind(f.eligibility)
        .bind(f.award_ceiling)
        .bind(f.award_floor)
        .bind(f.expected_awards)
        .bind(f.application_url)
        .bind(f.notes)
        .bind(Json(f.tags))
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_unique_violation(e, opportunity_number.as_deref()))?;

        row.map(Grant::from).ok_or_else(|| grant_not_found(id))
    }

    async fn set_grant_status(
        &self,
        pool: &SqlitePool,
        id: i64,
        status: String,
    ) -> Result<Grant, GrantDeskError> {
        let row = sqlx::query_as::<_, DbGrant>(&format!(
            r#"
            UPDATE grants SET status = ?, updated_at = ?
            WHERE id = ?
            RETURNING {GRANT_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Grant::from).ok_or_else(|| grant_not_found(id))
    }

    async fn delete_grant(&self, pool: &SqlitePool, id: i64) -> Result<(), GrantDeskError> {
        let res = sqlx::query("DELETE FROM grants WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        debug!(grant.id = id, rows = res.rows_affected(), "Grant delete");
        Ok(())
    }

    async fn dashboard(
        &self,
        pool: &SqlitePool,
        today: NaiveDate,
    ) -> Result<Dashboard, GrantDeskError> {
        let mut tx = pool.begin().await?;
        let dashboard = load_dashboard(&mut *tx, today).await?;
        tx.commit().await?;
        Ok(dashboard)
    }

    async fn list_settings(
        &self,
        pool: &SqlitePool,
    ) -> Result<BTreeMap<String, String>, GrantDeskError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn get_setting(
        &self,
        pool: &SqlitePool,
        key: &str,
    ) -> Result<Option<String>, GrantDeskError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(value)
    }

    async fn upsert_settings(
        &self,
        pool: &SqlitePool,
        settings: BTreeMap<String, String>,
    ) -> Result<(), GrantDeskError> {
        let mut tx = pool.begin().await?;
        for (key, value) in settings {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn grant_not_found(id: i64) -> GrantDeskError {
    GrantDeskError::NotFound(format!("grant {id}"))
}

fn map_unique_violation(err: sqlx::Error, opportunity_number: Option<&str>) -> GrantDeskError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if is_unique {
        GrantDeskError::Conflict(format!(
            "A grant with opportunity number `{}` already exists.",
            opportunity_number.unwrap_or_default()
        ))
    } else {
        GrantDeskError::DatabaseError(err)
    }
}

/// Spawn the database actor and return a cloneable handle.
///
/// Opens the pool and applies the schema before returning, so a bad
/// database URL surfaces here rather than on the first request.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, GrantDeskError> {
    let (actor, _jh) = ractor::Actor::spawn(
        Some(format!("DbActor:{database_url}")),
        DbActor,
        database_url.to_string(),
    )
    .await
    .map_err(|e| GrantDeskError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), GrantDeskError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
