//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;

use memoir_core::{RecordRepository, StoryGenerator};

use crate::auth::IdentityVerifier;
use crate::config::parse_allowed_origins;
use crate::services::{DeletionGate, ListingService, RecordLifecycle, WizardSessions};

/// Type alias for the global rate limiter.
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Cloned into every handler; all members are shared.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<RecordLifecycle>,
    pub listing: Arc<ListingService>,
    pub deletion: Arc<DeletionGate>,
    pub sessions: Arc<WizardSessions>,
    pub verifier: Arc<IdentityVerifier>,
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
    pub allowed_origins: Vec<HeaderValue>,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn RecordRepository>>,
        generator: Option<Arc<dyn StoryGenerator>>,
        verifier: IdentityVerifier,
        delete_token_ttl: Duration,
    ) -> Self {
        let lifecycle = Arc::new(RecordLifecycle::new(store, generator));
        Self {
            listing: Arc::new(ListingService::new(lifecycle.clone())),
            deletion: Arc::new(DeletionGate::new(lifecycle.clone(), delete_token_ttl)),
            sessions: Arc::new(WizardSessions::new(lifecycle.clone())),
            lifecycle,
            verifier: Arc::new(verifier),
            rate_limiter: None,
            allowed_origins: parse_allowed_origins(""),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: GlobalRateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
