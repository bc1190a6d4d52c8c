//! Record lifecycle: load, save and generate.
//!
//! Either collaborator may be absent. A missing store surfaces as
//! `StorageUnavailable` and a missing generator as `Config`, both checked
//! before any work is done.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use memoir_core::{
    AutobiographyRecord, Error, Principal, RecordRepository, Result, StoryGenerator, WritingStyle,
};

pub struct RecordLifecycle {
    store: Option<Arc<dyn RecordRepository>>,
    generator: Option<Arc<dyn StoryGenerator>>,
}

impl RecordLifecycle {
    pub fn new(
        store: Option<Arc<dyn RecordRepository>>,
        generator: Option<Arc<dyn StoryGenerator>>,
    ) -> Self {
        Self { store, generator }
    }

    pub(crate) fn store(&self) -> Result<&dyn RecordRepository> {
        self.store
            .as_deref()
            .ok_or_else(|| Error::StorageUnavailable("Record store is not configured".to_string()))
    }

    /// Name of the configured store, if any.
    pub fn store_backend(&self) -> Option<&'static str> {
        self.store.as_ref().map(|s| s.backend_name())
    }

    /// Model behind the configured generator, if any.
    pub fn generator_model(&self) -> Option<String> {
        self.generator.as_ref().map(|g| g.model_name().to_string())
    }

    /// All records owned by `owner_id`, in store order.
    pub async fn load(&self, owner_id: &str) -> Result<Vec<AutobiographyRecord>> {
        let records = self.store()?.list_by_owner(owner_id).await?;
        debug!(
            subsystem = "api",
            component = "lifecycle",
            op = "load",
            owner_id = %owner_id,
            result_count = records.len(),
            "Loaded records"
        );
        Ok(records)
    }

    /// A single record the actor may read.
    pub async fn get(&self, id: Uuid, actor: &Principal) -> Result<AutobiographyRecord> {
        let record = self
            .store()?
            .fetch(id)
            .await?
            .ok_or(Error::RecordNotFound(id))?;
        if !actor.can_access(&record) {
            return Err(Error::Forbidden(
                "You do not have access to this autobiography".to_string(),
            ));
        }
        Ok(record)
    }

    /// Persist `draft` and return the stored record.
    ///
    /// A draft without an id is inserted with the actor as owner and both
    /// timestamps set to now. A draft with an id overwrites the content of
    /// the stored record; its owner and `created_at` are kept and
    /// `updated_at` is refreshed.
    pub async fn save(
        &self,
        draft: &AutobiographyRecord,
        actor: &Principal,
    ) -> Result<AutobiographyRecord> {
        let store = self.store()?;
        let now = Utc::now();

        match draft.id {
            None => {
                let mut record = draft.clone();
                record.owner_id = actor.uid.clone();
                record.created_at = Some(now);
                record.updated_at = Some(now);
                let id = store.insert(&record).await?;
                record.id = Some(id);
                info!(
                    subsystem = "api",
                    component = "lifecycle",
                    op = "save",
                    record_id = %id,
                    owner_id = %actor.uid,
                    "Created autobiography"
                );
                Ok(record)
            }
            Some(id) => {
                let mut stored = store.fetch(id).await?.ok_or(Error::RecordNotFound(id))?;
                if !actor.can_access(&stored) {
                    warn!(
                        subsystem = "api",
                        component = "lifecycle",
                        op = "save",
                        record_id = %id,
                        owner_id = %actor.uid,
                        "Rejected update of another user's autobiography"
                    );
                    return Err(Error::Forbidden(
                        "You do not have access to this autobiography".to_string(),
                    ));
                }
                stored.overwrite_content_from(draft);
                stored.updated_at = Some(now);
                store.update(id, &stored).await?;
                info!(
                    subsystem = "api",
                    component = "lifecycle",
                    op = "save",
                    record_id = %id,
                    owner_id = %actor.uid,
                    "Updated autobiography"
                );
                Ok(stored)
            }
        }
    }

    /// Generate a story for `draft`. On success the returned copy carries the
    /// story; nothing is persisted and `draft` is never modified.
    pub async fn generate(
        &self,
        draft: &AutobiographyRecord,
        style: WritingStyle,
    ) -> Result<AutobiographyRecord> {
        let generator = self
            .generator
            .as_deref()
            .ok_or_else(|| Error::Config("Story generation is not configured".to_string()))?;

        let start = Instant::now();
        let story = generator.generate_story(draft, style).await?;
        debug!(
            subsystem = "api",
            component = "lifecycle",
            op = "generate",
            style = %style,
            response_len = story.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated story for draft"
        );

        let mut updated = draft.clone();
        updated.generated_story = Some(story);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_db::MemoryRecordRepository;
    use memoir_inference::mock::MockGenerationBackend;
    use memoir_inference::LlmStoryGenerator;

    fn lifecycle_with(backend: Option<MockGenerationBackend>) -> RecordLifecycle {
        let store: Arc<dyn RecordRepository> = Arc::new(MemoryRecordRepository::new());
        let generator = backend
            .map(|b| Arc::new(LlmStoryGenerator::new(b)) as Arc<dyn StoryGenerator>);
        RecordLifecycle::new(Some(store), generator)
    }

    #[tokio::test]
    async fn test_save_new_then_load_round_trip() {
        let lifecycle = lifecycle_with(None);
        let alice = Principal::user("alice");

        let mut draft = AutobiographyRecord::new_draft("spoofed");
        draft.personal_info.name = "Alice".to_string();
        draft.education = "MIT".to_string();
        let saved = lifecycle.save(&draft, &alice).await.unwrap();

        assert!(saved.id.is_some());
        assert_eq!(saved.owner_id, "alice");
        assert_eq!(saved.created_at, saved.updated_at);

        let loaded = lifecycle.load("alice").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, saved.id);
        assert_eq!(loaded[0].personal_info.name, "Alice");
        assert_eq!(loaded[0].education, "MIT");
        assert!(lifecycle.load("spoofed").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let lifecycle = lifecycle_with(None);
        let alice = Principal::user("alice");
        let saved = lifecycle
            .save(&AutobiographyRecord::new_draft("alice"), &alice)
            .await
            .unwrap();

        let mut edit = saved.clone();
        edit.owner_id = "mallory".to_string();
        edit.created_at = None;
        edit.challenges = "Moving abroad".to_string();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = lifecycle.save(&edit, &alice).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.owner_id, "alice");
        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.updated_at > saved.updated_at);
        assert_eq!(updated.challenges, "Moving abroad");
    }

    #[tokio::test]
    async fn test_update_of_foreign_or_missing_record_rejected() {
        let lifecycle = lifecycle_with(None);
        let saved = lifecycle
            .save(&AutobiographyRecord::new_draft("alice"), &Principal::user("alice"))
            .await
            .unwrap();

        let err = lifecycle.save(&saved, &Principal::user("bob")).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(lifecycle.save(&saved, &Principal::admin("root")).await.is_ok());

        let mut ghost = saved.clone();
        ghost.id = Some(Uuid::now_v7());
        let err = lifecycle.save(&ghost, &Principal::user("alice")).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_checks_access() {
        let lifecycle = lifecycle_with(None);
        let saved = lifecycle
            .save(&AutobiographyRecord::new_draft("alice"), &Principal::user("alice"))
            .await
            .unwrap();
        let id = saved.id.unwrap();

        assert!(lifecycle.get(id, &Principal::user("alice")).await.is_ok());
        assert!(lifecycle.get(id, &Principal::admin("root")).await.is_ok());
        assert!(matches!(
            lifecycle.get(id, &Principal::user("bob")).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            lifecycle.get(Uuid::now_v7(), &Principal::user("alice")).await,
            Err(Error::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_store_is_unavailable() {
        let lifecycle = RecordLifecycle::new(None, None);
        assert!(lifecycle.store_backend().is_none());
        let err = lifecycle.load("alice").await.unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
        let err = lifecycle
            .save(&AutobiographyRecord::new_draft("a"), &Principal::user("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_generate_sets_story_on_copy() {
        let backend = MockGenerationBackend::new().with_fixed_response("Ada's poetic tale.");
        let lifecycle = lifecycle_with(Some(backend.clone()));

        let mut draft = AutobiographyRecord::new_draft("ada");
        draft.personal_info.name = "Ada".to_string();
        let generated = lifecycle.generate(&draft, WritingStyle::Poetic).await.unwrap();

        assert_eq!(generated.generated_story.as_deref(), Some("Ada's poetic tale."));
        assert!(draft.generated_story.is_none());
        assert_eq!(backend.generate_call_count(), 1);
        assert!(backend.get_calls()[0].prompt.contains("poetic"));

        let saved = lifecycle.save(&generated, &Principal::user("ada")).await.unwrap();
        let loaded = lifecycle.load("ada").await.unwrap();
        assert_eq!(loaded[0].id, saved.id);
        assert_eq!(loaded[0].generated_story.as_deref(), Some("Ada's poetic tale."));
    }

    #[tokio::test]
    async fn test_generate_without_backend_or_on_failure() {
        let lifecycle = lifecycle_with(None);
        let draft = AutobiographyRecord::new_draft("ada");
        assert!(lifecycle.generator_model().is_none());
        assert!(matches!(
            lifecycle.generate(&draft, WritingStyle::Simple).await,
            Err(Error::Config(_))
        ));

        let lifecycle = lifecycle_with(Some(MockGenerationBackend::new().failing()));
        assert_eq!(lifecycle.generator_model().as_deref(), Some("mock-model"));
        assert!(matches!(
            lifecycle.generate(&draft, WritingStyle::Simple).await,
            Err(Error::Inference(_))
        ));
    }
}
