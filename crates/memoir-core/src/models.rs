//! Core data models for memoir.
//!
//! These types are shared across all memoir crates and represent the
//! autobiography record, its listing projections, and the acting principal.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Tone of the generated prose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    #[default]
    Emotional,
    Professional,
    Simple,
    Poetic,
}

impl WritingStyle {
    pub const ALL: [WritingStyle; 4] = [
        WritingStyle::Emotional,
        WritingStyle::Professional,
        WritingStyle::Simple,
        WritingStyle::Poetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WritingStyle::Emotional => "emotional",
            WritingStyle::Professional => "professional",
            WritingStyle::Simple => "simple",
            WritingStyle::Poetic => "poetic",
        }
    }
}

impl fmt::Display for WritingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "emotional" => Ok(WritingStyle::Emotional),
            "professional" => Ok(WritingStyle::Professional),
            "simple" => Ok(WritingStyle::Simple),
            "poetic" => Ok(WritingStyle::Poetic),
            other => Err(Error::InvalidInput(format!(
                "Unknown writing style '{}', expected one of: emotional, professional, simple, poetic",
                other
            ))),
        }
    }
}

/// Category of a timeline event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineCategory {
    Childhood,
    Education,
    Career,
    Family,
    Achievement,
    Challenge,
    #[default]
    Other,
}

impl TimelineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineCategory::Childhood => "childhood",
            TimelineCategory::Education => "education",
            TimelineCategory::Career => "career",
            TimelineCategory::Family => "family",
            TimelineCategory::Achievement => "achievement",
            TimelineCategory::Challenge => "challenge",
            TimelineCategory::Other => "other",
        }
    }
}

impl fmt::Display for TimelineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RECORD TYPES
// =============================================================================

/// Identifying details about the subject of the autobiography.
///
/// All fields are free-form; none is required while the wizard is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    /// Date of birth as entered by the user, not parsed.
    pub dob: String,
    pub birthplace: String,
    pub background: String,
}

/// A dated entry in a record's chronological sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEvent {
    /// Local token, unique within one record's timeline only.
    pub id: String,
    pub year: String,
    pub title: String,
    pub description: String,
    pub category: TimelineCategory,
}

/// Presentation settings for the generated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub title: String,
    pub style: WritingStyle,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            title: defaults::RECORD_TITLE.to_string(),
            style: WritingStyle::default(),
        }
    }
}

/// The central entity: one user's autobiography, draft or persisted.
///
/// A record without an `id` has never been saved. `generated_story` reflects
/// the record at the time of the last generation and is not invalidated by
/// later edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutobiographyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Owner identity. Immutable once the record has been created.
    #[serde(rename = "uid")]
    pub owner_id: String,
    pub personal_info: PersonalInfo,
    pub childhood_memories: String,
    pub education: String,
    pub career_achievements: String,
    pub family_relationships: String,
    pub challenges: String,
    pub dreams_future: String,
    pub timeline: Vec<TimelineEvent>,
    pub customization: Customization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_story: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AutobiographyRecord {
    /// Fresh in-memory draft with empty fields and default customization.
    pub fn new_draft(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// Whether the record has ever been saved.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Generated story, if one exists and is not blank.
    pub fn story(&self) -> Option<&str> {
        self.generated_story.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Narrative sections paired with their headings, in presentation order.
    pub fn narrative_sections(&self) -> [(&'static str, &str); 6] {
        [
            ("Childhood memories", &self.childhood_memories),
            ("Education", &self.education),
            ("Career and achievements", &self.career_achievements),
            ("Family and relationships", &self.family_relationships),
            ("Challenges and lessons", &self.challenges),
            ("Dreams and future", &self.dreams_future),
        ]
    }

    /// Reject text PostgreSQL `text`/`jsonb` columns cannot hold (U+0000).
    /// Every store applies the same rule so behaviour does not depend on
    /// the backend.
    pub fn check_storable(&self) -> Result<()> {
        let info = &self.personal_info;
        let mut fields = [
            &self.owner_id,
            &info.name,
            &info.dob,
            &info.birthplace,
            &info.background,
            &self.childhood_memories,
            &self.education,
            &self.career_achievements,
            &self.family_relationships,
            &self.challenges,
            &self.dreams_future,
            &self.customization.title,
        ]
        .into_iter()
        .chain(
            self.timeline
                .iter()
                .flat_map(|e| [&e.id, &e.year, &e.title, &e.description]),
        )
        .chain(self.generated_story.iter());

        if fields.any(|f| f.contains('\0')) {
            return Err(Error::InvalidInput(
                "Text fields must not contain NUL characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy every user-editable field from `other`, leaving identity,
    /// ownership and timestamps untouched.
    pub fn overwrite_content_from(&mut self, other: &AutobiographyRecord) {
        self.personal_info = other.personal_info.clone();
        self.childhood_memories = other.childhood_memories.clone();
        self.education = other.education.clone();
        self.career_achievements = other.career_achievements.clone();
        self.family_relationships = other.family_relationships.clone();
        self.challenges = other.challenges.clone();
        self.dreams_future = other.dreams_future.clone();
        self.timeline = other.timeline.clone();
        self.customization = other.customization.clone();
        self.generated_story = other.generated_story.clone();
    }
}

// =============================================================================
// LISTING PROJECTIONS
// =============================================================================

/// Which listing surface a summary is rendered for. Each surface has its own
/// fallback text for blank fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryView {
    Dashboard,
    Admin,
}

impl SummaryView {
    pub fn untitled(&self) -> &'static str {
        match self {
            SummaryView::Dashboard => defaults::DASHBOARD_UNTITLED,
            SummaryView::Admin => defaults::ADMIN_UNTITLED,
        }
    }

    pub fn unnamed_owner(&self) -> &'static str {
        match self {
            SummaryView::Dashboard => defaults::DASHBOARD_NO_NAME,
            SummaryView::Admin => defaults::ADMIN_UNKNOWN_OWNER,
        }
    }
}

/// Listing row for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: Option<Uuid>,
    pub title: String,
    pub owner_name: String,
    pub created_at: String,
    pub updated_at: String,
    pub style: WritingStyle,
    pub has_story: bool,
}

impl RecordSummary {
    /// Default projection of a record into a listing row.
    ///
    /// Blank title and owner name fall back to the view's placeholder text;
    /// missing timestamps render as "Unknown"; dates render as `YYYY-MM-DD`.
    pub fn project(record: &AutobiographyRecord, view: SummaryView) -> Self {
        Self {
            id: record.id,
            title: non_blank(&record.customization.title)
                .unwrap_or(view.untitled())
                .to_string(),
            owner_name: non_blank(&record.personal_info.name)
                .unwrap_or(view.unnamed_owner())
                .to_string(),
            created_at: display_date(record.created_at),
            updated_at: display_date(record.updated_at),
            style: record.customization.style,
            has_story: record.story().is_some(),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn display_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(defaults::DATE_FORMAT).to_string())
        .unwrap_or_else(|| defaults::UNKNOWN_TIMESTAMP.to_string())
}

/// Aggregate counters for the admin surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Number of distinct owner identities.
    pub total_users: usize,
    pub total_autobiographies: usize,
}

impl AdminStats {
    pub fn from_records(records: &[AutobiographyRecord]) -> Self {
        let owners: HashSet<&str> = records.iter().map(|r| r.owner_id.as_str()).collect();
        Self {
            total_users: owners.len(),
            total_autobiographies: records.len(),
        }
    }
}

// =============================================================================
// PRINCIPAL
// =============================================================================

/// Verified identity of the caller, as asserted by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

impl Principal {
    pub fn user(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            is_admin: false,
        }
    }

    pub fn admin(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            is_admin: true,
        }
    }

    pub fn owns(&self, record: &AutobiographyRecord) -> bool {
        record.owner_id == self.uid
    }

    /// Owner or admin.
    pub fn can_access(&self, record: &AutobiographyRecord) -> bool {
        self.is_admin || self.owns(record)
    }
}
