//! Service layer for business logic.
//!
//! Handlers stay thin: they extract the caller and hand off to one of these
//! services, which own every rule about who may read, change or delete a
//! record.

pub mod deletion;
pub mod lifecycle;
pub mod listing;
pub mod sessions;

pub use deletion::{DeleteScope, DeletionGate, DeletionTicket};
pub use lifecycle::RecordLifecycle;
pub use listing::{AdminView, ListingService};
pub use sessions::{SessionView, WizardSession, WizardSessions};
