//! Core traits for memoir abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AutobiographyRecord, WritingStyle};

// =============================================================================
// RECORD REPOSITORY TRAITS
// =============================================================================

/// Durable keyed storage for autobiography records.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert a new record and return its assigned id.
    ///
    /// Any `id` already present on `record` is ignored. Timestamps are taken
    /// from the record; a missing timestamp is stored as now.
    async fn insert(&self, record: &AutobiographyRecord) -> Result<Uuid>;

    /// Overwrite the content fields and `updated_at` of an existing record.
    ///
    /// The stored owner and `created_at` are never changed. Returns
    /// `Error::RecordNotFound` when no record has this id.
    async fn update(&self, id: Uuid, record: &AutobiographyRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<AutobiographyRecord>>;

    /// All records owned by `owner_id`, in the store's natural order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AutobiographyRecord>>;

    /// Every record regardless of owner.
    async fn list_all(&self) -> Result<Vec<AutobiographyRecord>>;

    /// Permanently remove a record. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Check if a record exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Short name of the backing store, for health output and logs.
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// GENERATION TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Turns a biography payload and a style tag into prose.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate a story for `record` in the given style.
    async fn generate_story(
        &self,
        record: &AutobiographyRecord,
        style: WritingStyle,
    ) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
