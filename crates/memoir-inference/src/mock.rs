//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memoir_inference::mock::MockGenerationBackend;
//! use memoir_inference::LlmStoryGenerator;
//!
//! let backend = MockGenerationBackend::new().with_fixed_response("Test story");
//! let generator = LlmStoryGenerator::new(backend.clone());
//! // ... drive code under test, then:
//! assert_eq!(backend.generate_call_count(), 1);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use memoir_core::{Error, GenerationBackend, Result};

/// Mock generation backend. Clones share one call log.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model_name: String,
    response: String,
    latency_ms: u64,
    fail: bool,
}

/// One recorded generation request.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-model".to_string(),
            response: "Mock story".to_string(),
            latency_ms: 0,
            fail: false,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the text returned for every request.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = response.into();
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model_name = name.into();
        self
    }

    /// Set simulated latency for every request.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Fail every request with an inference error.
    pub fn failing(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    pub fn generate_call_count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.log().push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            timestamp: std::time::Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail {
            return Err(Error::Inference("Simulated failure".to_string()));
        }
        Ok(self.config.response.clone())
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
