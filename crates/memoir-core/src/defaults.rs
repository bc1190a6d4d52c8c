//! Centralized default constants for memoir.
//!
//! Shared default values live here so the API, store and renderers agree.

// =============================================================================
// RECORD DEFAULTS
// =============================================================================

/// Title given to a fresh draft.
pub const RECORD_TITLE: &str = "My Life Story";

// =============================================================================
// LISTING FALLBACKS
// =============================================================================

/// Dashboard title shown for a record with a blank title.
pub const DASHBOARD_UNTITLED: &str = "Untitled Autobiography";

/// Dashboard owner name shown for a record with a blank name.
pub const DASHBOARD_NO_NAME: &str = "No name";

/// Admin title shown for a record with a blank title.
pub const ADMIN_UNTITLED: &str = "Untitled";

/// Admin owner name shown for a record with a blank name.
pub const ADMIN_UNKNOWN_OWNER: &str = "Unknown";

/// Timestamp text shown when a record has no timestamp.
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

/// Display format for record timestamps in listings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// DELETION
// =============================================================================

/// Lifetime of a deletion confirmation token in seconds.
pub const DELETE_TOKEN_TTL_SECS: u64 = 300;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3000;

/// Default global rate limit (requests per period).
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Minimum length of the identity token secret.
pub const JWT_SECRET_MIN_LEN: usize = 32;

// =============================================================================
// EXPORT
// =============================================================================

/// File stem used when a title slugifies to nothing.
pub const EXPORT_FILE_STEM: &str = "autobiography";

/// Document heading used when the record's title is blank.
pub const EXPORT_HEADING: &str = "Autobiography";
