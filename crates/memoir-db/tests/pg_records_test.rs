//! PostgreSQL record repository tests.
//!
//! Skipped unless DATABASE_URL points at a reachable server.

use chrono::{Duration, TimeZone, Utc};
use memoir_db::test_fixtures::TestDatabase;
use memoir_db::{
    AutobiographyRecord, Error, RecordRepository, TimelineCategory, TimelineEvent, WritingStyle,
};

async fn setup() -> Option<TestDatabase> {
    let _ = dotenvy::dotenv();
    let db = TestDatabase::connect().await;
    if db.is_none() {
        eprintln!("DATABASE_URL not set or unreachable, skipping");
    }
    db
}

fn sample(owner: &str) -> AutobiographyRecord {
    let mut record = AutobiographyRecord::new_draft(owner);
    record.personal_info.name = "Ada Lovelace".to_string();
    record.personal_info.birthplace = "London".to_string();
    record.education = "Mathematics".to_string();
    record.customization.style = WritingStyle::Poetic;
    record.timeline.push(TimelineEvent {
        id: "1700000000000".to_string(),
        year: "1843".to_string(),
        title: "Notes published".to_string(),
        description: String::new(),
        category: TimelineCategory::Achievement,
    });
    record
}

#[tokio::test]
async fn test_insert_fetch_preserves_content() {
    let Some(test_db) = setup().await else { return };
    let repo = &test_db.db.records;
    let owner = test_db.owner("roundtrip");

    let id = repo.insert(&sample(&owner)).await.unwrap();
    let stored = repo.fetch(id).await.unwrap().expect("record should exist");

    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.owner_id, owner);
    assert_eq!(stored.personal_info.birthplace, "London");
    assert_eq!(stored.customization.style, WritingStyle::Poetic);
    assert_eq!(stored.timeline.len(), 1);
    assert_eq!(stored.timeline[0].category, TimelineCategory::Achievement);
    assert!(stored.generated_story.is_none());
    assert!(stored.created_at.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_update_never_changes_owner_or_created_at() {
    let Some(test_db) = setup().await else { return };
    let repo = &test_db.db.records;
    let owner = test_db.owner("update");

    let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let mut record = sample(&owner);
    record.created_at = Some(created);
    record.updated_at = Some(created);
    let id = repo.insert(&record).await.unwrap();

    let mut edited = sample("someone-else");
    edited.generated_story = Some("A story.".to_string());
    edited.updated_at = Some(created + Duration::hours(3));
    repo.update(id, &edited).await.unwrap();

    let stored = repo.fetch(id).await.unwrap().unwrap();
    assert_eq!(stored.owner_id, owner);
    assert_eq!(stored.created_at, Some(created));
    assert_eq!(stored.updated_at, Some(created + Duration::hours(3)));
    assert_eq!(stored.generated_story.as_deref(), Some("A story."));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let Some(test_db) = setup().await else { return };
    let missing = uuid::Uuid::now_v7();
    let err = test_db
        .db
        .records
        .update(missing, &sample("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_list_by_owner_and_delete() {
    let Some(test_db) = setup().await else { return };
    let repo = &test_db.db.records;
    let alice = test_db.owner("alice");
    let bob = test_db.owner("bob");

    let a = repo.insert(&sample(&alice)).await.unwrap();
    repo.insert(&sample(&bob)).await.unwrap();

    let listed = repo.list_by_owner(&alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, Some(a));

    assert!(repo.delete(a).await.unwrap());
    assert!(!repo.exists(a).await.unwrap());
    assert!(repo.list_by_owner(&alice).await.unwrap().is_empty());

    test_db.cleanup().await;
}
