//! [`StoryGenerator`] over a text-generation backend.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use memoir_core::{AutobiographyRecord, Error, GenerationBackend, Result, StoryGenerator, WritingStyle};

use crate::prompt::build_story_prompt;

/// Builds the biography prompt and hands it to a [`GenerationBackend`].
pub struct LlmStoryGenerator<B> {
    backend: B,
}

impl<B: GenerationBackend> LlmStoryGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: GenerationBackend> StoryGenerator for LlmStoryGenerator<B> {
    async fn generate_story(
        &self,
        record: &AutobiographyRecord,
        style: WritingStyle,
    ) -> Result<String> {
        let start = Instant::now();
        let prompt = build_story_prompt(record, style);

        let story = match self
            .backend
            .generate_with_system(&prompt.system, &prompt.user)
            .await
        {
            Ok(story) => story.trim().to_string(),
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "story",
                    op = "generate",
                    style = %style,
                    model = self.backend.model_name(),
                    error = %e,
                    "Story generation failed"
                );
                return Err(e);
            }
        };

        if story.is_empty() {
            return Err(Error::Inference("Model returned an empty story".to_string()));
        }

        info!(
            subsystem = "inference",
            component = "story",
            op = "generate",
            style = %style,
            model = self.backend.model_name(),
            prompt_len = prompt.user.len(),
            response_len = story.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Story generated"
        );
        Ok(story)
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;

    #[tokio::test]
    async fn test_generate_story_trims_and_returns_text() {
        let backend = MockGenerationBackend::new().with_fixed_response("  Once upon a time.\n");
        let generator = LlmStoryGenerator::new(backend.clone());

        let mut record = AutobiographyRecord::new_draft("u");
        record.personal_info.name = "Ada".to_string();
        let story = generator
            .generate_story(&record, WritingStyle::Poetic)
            .await
            .unwrap();

        assert_eq!(story, "Once upon a time.");
        let calls = backend.get_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("lyrically"));
        assert!(calls[0].prompt.contains("- Name: Ada"));
    }

    #[tokio::test]
    async fn test_empty_model_output_is_error() {
        let backend = MockGenerationBackend::new().with_fixed_response("   ");
        let generator = LlmStoryGenerator::new(backend);
        let err = generator
            .generate_story(&AutobiographyRecord::new_draft("u"), WritingStyle::Simple)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let backend = MockGenerationBackend::new().failing();
        let generator = LlmStoryGenerator::new(backend);
        let result = generator
            .generate_story(&AutobiographyRecord::new_draft("u"), WritingStyle::Emotional)
            .await;
        assert!(result.is_err());
        assert_eq!(generator.model_name(), "mock-model");
    }
}
