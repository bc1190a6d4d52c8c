//! In-process record store.
//!
//! Holds records in insertion order behind a `tokio` lock. Used when no
//! database is configured and by the API test suite.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use memoir_core::{AutobiographyRecord, Error, RecordRepository, Result};

#[derive(Default)]
pub struct MemoryRecordRepository {
    records: RwLock<Vec<AutobiographyRecord>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn insert(&self, record: &AutobiographyRecord) -> Result<Uuid> {
        record.check_storable()?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut stored = record.clone();
        stored.id = Some(id);
        stored.created_at = Some(record.created_at.unwrap_or(now));
        stored.updated_at = Some(record.updated_at.unwrap_or(now));

        self.records.write().await.push(stored);
        debug!(
            subsystem = "db",
            component = "memory",
            op = "insert",
            record_id = %id,
            owner_id = %record.owner_id,
            "Inserted record"
        );
        Ok(id)
    }

    async fn update(&self, id: Uuid, record: &AutobiographyRecord) -> Result<()> {
        record.check_storable()?;
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(Error::RecordNotFound(id))?;
        stored.overwrite_content_from(record);
        stored.updated_at = Some(record.updated_at.unwrap_or_else(Utc::now));
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<AutobiographyRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == Some(id))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AutobiographyRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<AutobiographyRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        Ok(records.len() != before)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.records.read().await.iter().any(|r| r.id == Some(id)))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn draft(owner: &str, name: &str) -> AutobiographyRecord {
        let mut record = AutobiographyRecord::new_draft(owner);
        record.personal_info.name = name.to_string();
        record
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let repo = MemoryRecordRepository::new();
        let mut record = draft("alice", "Alice");
        record.id = Some(Uuid::nil());

        let id = repo.insert(&record).await.unwrap();
        assert_ne!(id, Uuid::nil());

        let stored = repo.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert!(stored.created_at.is_some());
        assert!(stored.updated_at.is_some());
        assert_eq!(stored.personal_info.name, "Alice");
    }

    #[tokio::test]
    async fn test_nul_text_rejected_like_postgres() {
        let repo = MemoryRecordRepository::new();
        let id = repo.insert(&draft("alice", "Alice")).await.unwrap();

        let bad = draft("alice", "Al\0ice");
        assert!(matches!(repo.insert(&bad).await, Err(Error::InvalidInput(_))));
        assert!(matches!(repo.update(id, &bad).await, Err(Error::InvalidInput(_))));

        let stored = repo.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.personal_info.name, "Alice");
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let repo = MemoryRecordRepository::new();
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut record = draft("alice", "Alice");
        record.created_at = Some(created);
        record.updated_at = Some(created);
        let id = repo.insert(&record).await.unwrap();

        let mut edited = draft("mallory", "Alice B.");
        edited.created_at = Some(created + Duration::days(10));
        edited.updated_at = Some(created + Duration::days(1));
        repo.update(id, &edited).await.unwrap();

        let stored = repo.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.owner_id, "alice");
        assert_eq!(stored.created_at, Some(created));
        assert_eq!(stored.updated_at, Some(created + Duration::days(1)));
        assert_eq!(stored.personal_info.name, "Alice B.");
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let repo = MemoryRecordRepository::new();
        let missing = Uuid::now_v7();
        let err = repo
            .update(missing, &draft("alice", "Alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_list_by_owner_scopes_and_keeps_order() {
        let repo = MemoryRecordRepository::new();
        let a1 = repo.insert(&draft("alice", "first")).await.unwrap();
        repo.insert(&draft("bob", "bob")).await.unwrap();
        let a2 = repo.insert(&draft("alice", "second")).await.unwrap();

        let alice = repo.list_by_owner("alice").await.unwrap();
        let ids: Vec<Option<Uuid>> = alice.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(a1), Some(a2)]);
        assert!(repo.list_by_owner("carol").await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let repo = MemoryRecordRepository::new();
        let id = repo.insert(&draft("alice", "Alice")).await.unwrap();
        assert!(repo.exists(id).await.unwrap());

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.exists(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.is_empty().await);
    }
}
