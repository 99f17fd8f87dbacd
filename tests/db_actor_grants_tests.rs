mod common;

use chrono::NaiveDate;
use common::TestDb;
use grantdesk::GrantDeskError;
use grantdesk::db::{GrantFields, GrantInput, STATUS_TRACKING};
use serde_json::json;
use std::time::Duration;

fn fields(value: serde_json::Value) -> GrantFields {
    serde_json::from_value::<GrantInput>(value)
        .expect("valid grant input")
        .into_fields()
        .expect("valid grant fields")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn grant_crud_baseline() {
    let db = TestDb::spawn("grant-crud").await;
    let store = &db.handle;

    // 1. Fresh store is empty.
    assert!(store.list_grants(None).await.unwrap().is_empty());

    // 2. Create fills defaults and server-side fields.
    let created = store
        .create_grant(fields(json!({
            "title": "Rural Water Capacity",
            "agency": "EPA",
            "opportunity_number": "EPA-R-2025-01",
            "funding_amount": 25000.0,
            "deadline": "2026-03-14",
            "tags": ["water", "rural"]
        })))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, STATUS_TRACKING);
    assert_eq!(created.tags, vec!["water".to_string(), "rural".to_string()]);
    assert_eq!(created.deadline, Some(date(2026, 3, 14)));
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.description, None);

    // 3. Get returns the same record, tags decoded.
    let fetched = store.get_grant(created.id).await.unwrap();
    assert_eq!(fetched, created);

    // 4. Full update clears omitted fields, keeps created_at, bumps updated_at.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = store
        .update_grant(
            created.id,
            fields(json!({
                "title": "Rural Water Capacity (revised)",
                "opportunity_number": "EPA-R-2025-01",
                "status": "applied"
            })),
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.status, "applied");
    assert_eq!(updated.agency, None);
    assert_eq!(updated.funding_amount, None);
    assert!(updated.tags.is_empty());
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    // 5. Status transition touches only status and updated_at.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let awarded = store
        .set_grant_status(created.id, "awarded".to_string())
        .await
        .unwrap();
    assert_eq!(awarded.status, "awarded");
    assert_eq!(awarded.title, updated.title);
    assert_eq!(awarded.created_at, created.created_at);
    assert!(awarded.updated_at > updated.updated_at);
    assert_eq!(store.get_grant(created.id).await.unwrap(), awarded);

    // 6. Delete is idempotent; get afterwards is NotFound.
    store.delete_grant(created.id).await.unwrap();
    store.delete_grant(created.id).await.unwrap();
    let err = store.get_grant(created.id).await.unwrap_err();
    assert!(matches!(err, GrantDeskError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_opportunity_number_is_conflict() {
    let db = TestDb::spawn("grant-conflict").await;
    let store = &db.handle;

    let first = store
        .create_grant(fields(json!({"title": "A", "opportunity_number": "HHS-1"})))
        .await
        .unwrap();

    let err = store
        .create_grant(fields(json!({"title": "B", "opportunity_number": "HHS-1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, GrantDeskError::Conflict(_)), "got {err:?}");

    // Update onto another row's number also conflicts.
    let second = store
        .create_grant(fields(json!({"title": "C", "opportunity_number": "HHS-2"})))
        .await
        .unwrap();
    assert!(second.id > first.id);
    let err = store
        .update_grant(
            second.id,
            fields(json!({"title": "C", "opportunity_number": "HHS-1"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GrantDeskError::Conflict(_)), "got {err:?}");

    // Grants without a number never collide.
    store
        .create_grant(fields(json!({"title": "D"})))
        .await
        .unwrap();
    store
        .create_grant(fields(json!({"title": "E", "opportunity_number": ""})))
        .await
        .unwrap();
    assert_eq!(store.list_grants(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let db = TestDb::spawn("grant-ids").await;
    let store = &db.handle;

    let a = store.create_grant(fields(json!({"title": "A"}))).await.unwrap();
    store.delete_grant(a.id).await.unwrap();
    let b = store.create_grant(fields(json!({"title": "B"}))).await.unwrap();
    assert!(b.id > a.id);
}

#[tokio::test]
async fn missing_ids_are_not_found_on_mutation() {
    let db = TestDb::spawn("grant-missing").await;
    let store = &db.handle;

    let err = store
        .update_grant(404, fields(json!({"title": "ghost"})))
        .await
        .unwrap_err();
    assert!(matches!(err, GrantDeskError::NotFound(_)), "got {err:?}");

    let err = store
        .set_grant_status(404, "applied".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, GrantDeskError::NotFound(_)), "got {err:?}");

    // Update of a missing id must not create it.
    assert!(store.list_grants(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_by_deadline_with_missing_last_and_filters_status() {
    let db = TestDb::spawn("grant-list").await;
    let store = &db.handle;

    for (title, deadline, status) in [
        ("no-deadline", None, "tracking"),
        ("late", Some("2026-09-01"), "applied"),
        ("early", Some("2026-01-15"), "tracking"),
        ("middle", Some("2026-05-01"), "tracking"),
    ] {
        store
            .create_grant(fields(json!({
                "title": title,
                "deadline": deadline,
                "status": status
            })))
            .await
            .unwrap();
    }

    let titles: Vec<String> = store
        .list_grants(None)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, ["early", "middle", "late", "no-deadline"]);

    let tracking = store
        .list_grants(Some("tracking".to_string()))
        .await
        .unwrap();
    assert_eq!(tracking.len(), 3);
    assert!(tracking.iter().all(|g| g.status == "tracking"));
    let deadlines: Vec<_> = tracking.iter().filter_map(|g| g.deadline).collect();
    assert!(deadlines.windows(2).all(|w| w[0] <= w[1]));

    assert!(
        store
            .list_grants(Some("archived".to_string()))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn settings_upsert_and_read() {
    let db = TestDb::spawn("settings").await;
    let store = &db.handle;

    assert!(store.list_settings().await.unwrap().is_empty());
    assert_eq!(store.get_setting("grants_gov_api_key").await.unwrap(), None);

    store
        .upsert_settings(
            [
                ("grants_gov_api_key".to_string(), "first".to_string()),
                ("theme".to_string(), "dark".to_string()),
            ]
            .into(),
        )
        .await
        .unwrap();
    store
        .upsert_settings([("grants_gov_api_key".to_string(), "second".to_string())].into())
        .await
        .unwrap();

    let all = store.list_settings().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["grants_gov_api_key"], "second");
    assert_eq!(all["theme"], "dark");
    assert_eq!(
        store.get_setting("grants_gov_api_key").await.unwrap().as_deref(),
        Some("second")
    );
}

#[tokio::test]
async fn schema_init_is_idempotent_across_restarts() {
    let path = common::unique_sqlite_path("restart");
    let database_url = format!("sqlite:{}", path.display());

    let first = grantdesk::db::spawn(&database_url).await.unwrap();
    first
        .create_grant(fields(json!({"title": "persisted", "opportunity_number": "R-1"})))
        .await
        .unwrap();
    first.shutdown().await.unwrap();

    // Stopped handles fail instead of reaching a closed pool.
    let err = first.list_grants(None).await.unwrap_err();
    assert!(matches!(err, GrantDeskError::RactorError(_)), "got {err:?}");

    // Same URL: the stopped actor released its name, schema init runs again.
    let reopened = grantdesk::db::spawn(&database_url).await.unwrap();
    let grants = reopened.list_grants(None).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].title, "persisted");

    // Unique index survived the restart.
    let err = reopened
        .create_grant(fields(json!({"title": "dup", "opportunity_number": "R-1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, GrantDeskError::Conflict(_)), "got {err:?}");

    reopened.shutdown().await.unwrap();
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}
