//! Wizard state machine for composing an autobiography draft.
//!
//! The wizard holds one [`AutobiographyRecord`] draft and a pointer into ten
//! ordered steps. Every transition is expressed as a [`WizardAction`] and
//! applied with [`WizardState::apply`], which consumes the old state and
//! returns the new one. Nothing is validated for format here: users may jump
//! to any step with empty fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AutobiographyRecord, TimelineCategory, TimelineEvent, WritingStyle};

// =============================================================================
// STEPS
// =============================================================================

/// One page of the wizard, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Personal,
    Childhood,
    Education,
    Career,
    Family,
    Challenges,
    Dreams,
    Timeline,
    Customize,
    Generate,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Personal,
        Step::Childhood,
        Step::Education,
        Step::Career,
        Step::Family,
        Step::Challenges,
        Step::Dreams,
        Step::Timeline,
        Step::Customize,
        Step::Generate,
    ];

    pub fn first() -> Step {
        Step::Personal
    }

    pub fn last() -> Step {
        Step::Generate
    }

    /// Position in [`Step::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    /// Following step, or `self` at the end.
    pub fn next(self) -> Step {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    /// Preceding step, or `self` at the start.
    pub fn previous(self) -> Step {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Personal => "personal",
            Step::Childhood => "childhood",
            Step::Education => "education",
            Step::Career => "career",
            Step::Family => "family",
            Step::Challenges => "challenges",
            Step::Dreams => "dreams",
            Step::Timeline => "timeline",
            Step::Customize => "customize",
            Step::Generate => "generate",
        }
    }

    /// Human-readable label for progress displays.
    pub fn label(self) -> &'static str {
        match self {
            Step::Personal => "Personal Info",
            Step::Childhood => "Childhood",
            Step::Education => "Education",
            Step::Career => "Career",
            Step::Family => "Family",
            Step::Challenges => "Challenges",
            Step::Dreams => "Dreams",
            Step::Timeline => "Timeline",
            Step::Customize => "Customize",
            Step::Generate => "Generate",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown wizard step '{}'", s)))
    }
}

/// Where a step sits relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

/// Progress bar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub step: Step,
    pub label: &'static str,
    pub status: StepStatus,
}

// =============================================================================
// FIELD PATHS
// =============================================================================

/// Logical address of an editable scalar field on the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    #[serde(rename = "personalInfo.name")]
    Name,
    #[serde(rename = "personalInfo.dob")]
    DateOfBirth,
    #[serde(rename = "personalInfo.birthplace")]
    Birthplace,
    #[serde(rename = "personalInfo.background")]
    Background,
    #[serde(rename = "childhoodMemories")]
    ChildhoodMemories,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "careerAchievements")]
    CareerAchievements,
    #[serde(rename = "familyRelationships")]
    FamilyRelationships,
    #[serde(rename = "challenges")]
    Challenges,
    #[serde(rename = "dreamsFuture")]
    DreamsFuture,
    #[serde(rename = "customization.title")]
    Title,
    #[serde(rename = "customization.style")]
    Style,
}

impl FieldPath {
    pub const ALL: [FieldPath; 12] = [
        FieldPath::Name,
        FieldPath::DateOfBirth,
        FieldPath::Birthplace,
        FieldPath::Background,
        FieldPath::ChildhoodMemories,
        FieldPath::Education,
        FieldPath::CareerAchievements,
        FieldPath::FamilyRelationships,
        FieldPath::Challenges,
        FieldPath::DreamsFuture,
        FieldPath::Title,
        FieldPath::Style,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::Name => "personalInfo.name",
            FieldPath::DateOfBirth => "personalInfo.dob",
            FieldPath::Birthplace => "personalInfo.birthplace",
            FieldPath::Background => "personalInfo.background",
            FieldPath::ChildhoodMemories => "childhoodMemories",
            FieldPath::Education => "education",
            FieldPath::CareerAchievements => "careerAchievements",
            FieldPath::FamilyRelationships => "familyRelationships",
            FieldPath::Challenges => "challenges",
            FieldPath::DreamsFuture => "dreamsFuture",
            FieldPath::Title => "customization.title",
            FieldPath::Style => "customization.style",
        }
    }

    /// Current value of the field on `record`, as text.
    pub fn read(self, record: &AutobiographyRecord) -> String {
        match self {
            FieldPath::Name => record.personal_info.name.clone(),
            FieldPath::DateOfBirth => record.personal_info.dob.clone(),
            FieldPath::Birthplace => record.personal_info.birthplace.clone(),
            FieldPath::Background => record.personal_info.background.clone(),
            FieldPath::ChildhoodMemories => record.childhood_memories.clone(),
            FieldPath::Education => record.education.clone(),
            FieldPath::CareerAchievements => record.career_achievements.clone(),
            FieldPath::FamilyRelationships => record.family_relationships.clone(),
            FieldPath::Challenges => record.challenges.clone(),
            FieldPath::DreamsFuture => record.dreams_future.clone(),
            FieldPath::Title => record.customization.title.clone(),
            FieldPath::Style => record.customization.style.to_string(),
        }
    }

    fn slot(self, record: &mut AutobiographyRecord) -> Option<&mut String> {
        match self {
            FieldPath::Name => Some(&mut record.personal_info.name),
            FieldPath::DateOfBirth => Some(&mut record.personal_info.dob),
            FieldPath::Birthplace => Some(&mut record.personal_info.birthplace),
            FieldPath::Background => Some(&mut record.personal_info.background),
            FieldPath::ChildhoodMemories => Some(&mut record.childhood_memories),
            FieldPath::Education => Some(&mut record.education),
            FieldPath::CareerAchievements => Some(&mut record.career_achievements),
            FieldPath::FamilyRelationships => Some(&mut record.family_relationships),
            FieldPath::Challenges => Some(&mut record.challenges),
            FieldPath::DreamsFuture => Some(&mut record.dreams_future),
            FieldPath::Title => Some(&mut record.customization.title),
            FieldPath::Style => None,
        }
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::ALL
            .into_iter()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown field path '{}'", s)))
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Partial update for a timeline event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEventPatch {
    pub year: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TimelineCategory>,
}

impl TimelineEventPatch {
    fn apply_to(&self, event: &mut TimelineEvent) {
        if let Some(year) = &self.year {
            event.year = year.clone();
        }
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(category) = self.category {
            event.category = category;
        }
    }
}

/// A single wizard transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    GoToStep { step: Step },
    Next,
    Previous,
    UpdateField { path: FieldPath, value: String },
    AddTimelineEvent,
    UpdateTimelineEvent { id: String, patch: TimelineEventPatch },
    RemoveTimelineEvent { id: String },
}

// =============================================================================
// STATE
// =============================================================================

/// A draft plus the step the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub draft: AutobiographyRecord,
    pub step: Step,
}

impl WizardState {
    /// Start a new draft on the first step.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            draft: AutobiographyRecord::new_draft(owner_id),
            step: Step::first(),
        }
    }

    /// Re-open an existing record on the generate step.
    pub fn resume(record: AutobiographyRecord) -> Self {
        Self {
            draft: record,
            step: Step::Generate,
        }
    }

    /// Apply `action`, stamping new timeline ids with the current time.
    pub fn apply(self, action: WizardAction) -> Result<Self> {
        self.apply_at(action, Utc::now())
    }

    /// Apply `action` with an explicit clock, for deterministic ids.
    ///
    /// On error the input state is dropped; callers that must keep it should
    /// clone first.
    pub fn apply_at(mut self, action: WizardAction, now: DateTime<Utc>) -> Result<Self> {
        match action {
            WizardAction::GoToStep { step } => self.go_to_step(step),
            WizardAction::Next => self.next(),
            WizardAction::Previous => self.previous(),
            WizardAction::UpdateField { path, value } => self.update_field(path, value)?,
            WizardAction::AddTimelineEvent => {
                self.add_timeline_event(now);
            }
            WizardAction::UpdateTimelineEvent { id, patch } => {
                self.update_timeline_event(&id, &patch);
            }
            WizardAction::RemoveTimelineEvent { id } => {
                self.remove_timeline_event(&id);
            }
        }
        Ok(self)
    }

    pub fn go_to_step(&mut self, step: Step) {
        self.step = step;
    }

    pub fn next(&mut self) {
        self.step = self.step.next();
    }

    pub fn previous(&mut self) {
        self.step = self.step.previous();
    }

    /// Replace the value at `path`. Only the style field can reject a value.
    pub fn update_field(&mut self, path: FieldPath, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match path.slot(&mut self.draft) {
            Some(slot) => *slot = value,
            None => self.draft.customization.style = value.parse::<WritingStyle>()?,
        }
        Ok(())
    }

    /// Append a blank event in category `other` and return its id.
    pub fn add_timeline_event(&mut self, now: DateTime<Utc>) -> String {
        let id = next_event_id(&self.draft.timeline, now);
        self.draft.timeline.push(TimelineEvent {
            id: id.clone(),
            ..Default::default()
        });
        id
    }

    /// Merge `patch` into the event with `id`. Returns whether one matched;
    /// an unknown id leaves the timeline untouched.
    pub fn update_timeline_event(&mut self, id: &str, patch: &TimelineEventPatch) -> bool {
        match self.draft.timeline.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                patch.apply_to(event);
                true
            }
            None => {
                debug!(
                    subsystem = "core",
                    component = "wizard",
                    event_id = id,
                    "Ignoring update for unknown timeline event"
                );
                false
            }
        }
    }

    /// Remove the event with `id`, keeping the order of the rest.
    pub fn remove_timeline_event(&mut self, id: &str) -> bool {
        let before = self.draft.timeline.len();
        self.draft.timeline.retain(|e| e.id != id);
        self.draft.timeline.len() != before
    }

    pub fn progress(&self) -> Vec<StepProgress> {
        let current = self.step.index();
        Step::ALL
            .into_iter()
            .map(|step| StepProgress {
                step,
                label: step.label(),
                status: match step.index() {
                    i if i == current => StepStatus::Active,
                    i if i < current => StepStatus::Completed,
                    _ => StepStatus::Upcoming,
                },
            })
            .collect()
    }

    pub fn is_first_step(&self) -> bool {
        self.step == Step::first()
    }

    pub fn is_last_step(&self) -> bool {
        self.step == Step::last()
    }
}

/// Millisecond timestamp token, bumped until it is unused in `timeline`.
fn next_event_id(timeline: &[TimelineEvent], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !timeline.iter().any(|e| e.id == id) {
            return id;
        }
        candidate += 1;
    }
}
