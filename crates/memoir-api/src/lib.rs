//! # memoir-api
//!
//! HTTP surface for the memoir autobiography service.
//!
//! The binary in `main.rs` wires configuration, the record store and the
//! generation backend together; everything it serves is built here so the
//! router can be driven in tests without a network listener.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod services;
pub mod state;

pub use app::build_router;
pub use auth::{IdentityVerifier, RequireAdmin, RequireAuth};
pub use config::{AppConfig, RateLimitConfig, StoreKind};
pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use state::{AppState, GlobalRateLimiter};
