//! # memoir-inference
//!
//! Story generation for memoir.
//!
//! This crate provides:
//! - Prompt construction from an autobiography record and a writing style
//! - [`LlmStoryGenerator`], a [`StoryGenerator`] over any [`GenerationBackend`]
//! - OpenAI-compatible chat-completions backend (feature `openai`, default)
//! - Deterministic mock backend (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use memoir_inference::{LlmStoryGenerator, OpenAIBackend, StoryGenerator};
//! use memoir_core::{AutobiographyRecord, WritingStyle};
//!
//! #[tokio::main]
//! async fn main() {
//!     let generator = LlmStoryGenerator::new(OpenAIBackend::from_env().unwrap());
//!     let mut record = AutobiographyRecord::new_draft("user-1");
//!     record.personal_info.name = "Ada".to_string();
//!     let story = generator
//!         .generate_story(&record, WritingStyle::Poetic)
//!         .await
//!         .unwrap();
//!     println!("{}", story);
//! }
//! ```

pub mod prompt;
pub mod story;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use memoir_core::*;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

pub use prompt::{build_story_prompt, system_prompt, StoryPrompt};
pub use story::LlmStoryGenerator;
