//! # memoir-core
//!
//! Core types, traits, and abstractions for the memoir autobiography service.
//!
//! This crate provides the record model, the wizard state machine, and the
//! trait seams (record store, generation backend) that the other memoir
//! crates implement.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod wizard;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use wizard::{
    FieldPath, Step, StepProgress, StepStatus, TimelineEventPatch, WizardAction, WizardState,
};
