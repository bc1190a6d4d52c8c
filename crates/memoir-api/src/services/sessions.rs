//! Server-side wizard sessions.
//!
//! Each session owns one draft and is bound to the principal that opened it.
//! Another user's session id behaves exactly like an unknown one. The map
//! lock is never held across a store or generation call; concurrent calls
//! on one session are last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use memoir_core::{
    AutobiographyRecord, Error, Principal, Result, Step, StepProgress, WizardAction, WizardState,
};
use memoir_export::{export_record, ExportFormat, ExportedFile};

use super::lifecycle::RecordLifecycle;

/// Sessions untouched for this long are dropped.
const SESSION_IDLE_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: Uuid,
    pub owner_uid: String,
    pub state: WizardState,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the client renders for a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub step: Step,
    pub progress: Vec<StepProgress>,
    pub draft: AutobiographyRecord,
    pub is_first_step: bool,
    pub is_last_step: bool,
}

impl From<&WizardSession> for SessionView {
    fn from(session: &WizardSession) -> Self {
        Self {
            session_id: session.id,
            step: session.state.step,
            progress: session.state.progress(),
            draft: session.state.draft.clone(),
            is_first_step: session.state.is_first_step(),
            is_last_step: session.state.is_last_step(),
        }
    }
}

pub struct WizardSessions {
    lifecycle: Arc<RecordLifecycle>,
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
}

impl WizardSessions {
    pub fn new(lifecycle: Arc<RecordLifecycle>) -> Self {
        Self {
            lifecycle,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session on a fresh draft, or on `record_id` at the generate step.
    pub async fn open(&self, actor: &Principal, record_id: Option<Uuid>) -> Result<SessionView> {
        let state = match record_id {
            Some(id) => WizardState::resume(self.lifecycle.get(id, actor).await?),
            None => WizardState::new(actor.uid.clone()),
        };

        let now = Utc::now();
        let session = WizardSession {
            id: Uuid::now_v7(),
            owner_uid: actor.uid.clone(),
            state,
            opened_at: now,
            updated_at: now,
        };
        let view = SessionView::from(&session);

        let mut sessions = self.sessions.write().await;
        let cutoff = now - Duration::hours(SESSION_IDLE_HOURS);
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at > cutoff);
        if sessions.len() != before {
            debug!(
                subsystem = "api",
                component = "sessions",
                purged = before - sessions.len(),
                "Dropped idle wizard sessions"
            );
        }
        sessions.insert(session.id, session);
        drop(sessions);

        info!(
            subsystem = "api",
            component = "sessions",
            op = "open",
            session_id = %view.session_id,
            record_id = ?record_id,
            owner_id = %actor.uid,
            "Wizard session opened"
        );
        Ok(view)
    }

    pub async fn get(&self, id: Uuid, actor: &Principal) -> Result<SessionView> {
        let sessions = self.sessions.read().await;
        let session = owned(sessions.get(&id), id, actor)?;
        Ok(SessionView::from(session))
    }

    /// Apply one wizard action. A rejected action leaves the session unchanged.
    pub async fn apply(
        &self,
        id: Uuid,
        actor: &Principal,
        action: WizardAction,
    ) -> Result<SessionView> {
        let mut sessions = self.sessions.write().await;
        let session = owned_mut(sessions.get_mut(&id), id, actor)?;
        session.state = session.state.clone().apply(action)?;
        session.updated_at = Utc::now();
        Ok(SessionView::from(&*session))
    }

    /// Generate a story in the draft's chosen style and store it on the draft.
    pub async fn generate(&self, id: Uuid, actor: &Principal) -> Result<SessionView> {
        let draft = self.snapshot(id, actor).await?;
        let style = draft.customization.style;
        let generated = self.lifecycle.generate(&draft, style).await?;

        let mut sessions = self.sessions.write().await;
        let session = owned_mut(sessions.get_mut(&id), id, actor)?;
        session.state.draft.generated_story = generated.generated_story;
        session.updated_at = Utc::now();
        Ok(SessionView::from(&*session))
    }

    /// Persist the draft. The stored id and timestamps flow back into the
    /// session so later saves update the same record.
    pub async fn save(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<(AutobiographyRecord, SessionView)> {
        let draft = self.snapshot(id, actor).await?;
        let saved = self.lifecycle.save(&draft, actor).await?;

        let mut sessions = self.sessions.write().await;
        let session = owned_mut(sessions.get_mut(&id), id, actor)?;
        session.state.draft.id = saved.id;
        session.state.draft.owner_id = saved.owner_id.clone();
        session.state.draft.created_at = saved.created_at;
        session.state.draft.updated_at = saved.updated_at;
        session.updated_at = Utc::now();
        Ok((saved, SessionView::from(&*session)))
    }

    pub async fn export(
        &self,
        id: Uuid,
        actor: &Principal,
        format: ExportFormat,
    ) -> Result<ExportedFile> {
        let draft = self.snapshot(id, actor).await?;
        export_record(&draft, format)
    }

    pub async fn discard(&self, id: Uuid, actor: &Principal) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        owned(sessions.get(&id), id, actor)?;
        sessions.remove(&id);
        debug!(
            subsystem = "api",
            component = "sessions",
            op = "discard",
            session_id = %id,
            "Wizard session discarded"
        );
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn snapshot(&self, id: Uuid, actor: &Principal) -> Result<AutobiographyRecord> {
        let sessions = self.sessions.read().await;
        Ok(owned(sessions.get(&id), id, actor)?.state.draft.clone())
    }
}

fn owned<'a>(
    session: Option<&'a WizardSession>,
    id: Uuid,
    actor: &Principal,
) -> Result<&'a WizardSession> {
    session
        .filter(|s| s.owner_uid == actor.uid)
        .ok_or(Error::SessionNotFound(id))
}

fn owned_mut<'a>(
    session: Option<&'a mut WizardSession>,
    id: Uuid,
    actor: &Principal,
) -> Result<&'a mut WizardSession> {
    session
        .filter(|s| s.owner_uid == actor.uid)
        .ok_or(Error::SessionNotFound(id))
}
