//! Two-step record deletion.
//!
//! `request_delete` issues a single-use token bound to one record and one
//! actor; `confirm_delete` consumes it and removes the record. A token that
//! is missing, unknown, expired or bound elsewhere leaves the store untouched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use memoir_core::{Error, Principal, Result};

use super::lifecycle::RecordLifecycle;

/// Which surface a deletion is requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Dashboard: only the record's owner.
    Owner,
    /// Admin surface: any record, admin role required.
    Admin,
}

/// Returned from a deletion request; the client echoes `token` to confirm.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionTicket {
    pub token: String,
    pub record_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub expires_in_secs: u64,
}

#[derive(Debug, Clone)]
struct PendingDeletion {
    record_id: Uuid,
    actor_uid: String,
    expires_at: DateTime<Utc>,
}

pub struct DeletionGate {
    lifecycle: Arc<RecordLifecycle>,
    ttl: Duration,
    tokens: Mutex<HashMap<String, PendingDeletion>>,
}

impl DeletionGate {
    pub fn new(lifecycle: Arc<RecordLifecycle>, ttl: Duration) -> Self {
        Self {
            lifecycle,
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub async fn request_delete(
        &self,
        id: Uuid,
        actor: &Principal,
        scope: DeleteScope,
    ) -> Result<DeletionTicket> {
        let record = self
            .lifecycle
            .store()?
            .fetch(id)
            .await?
            .ok_or(Error::RecordNotFound(id))?;

        let allowed = match scope {
            DeleteScope::Owner => actor.owns(&record),
            DeleteScope::Admin => actor.is_admin,
        };
        if !allowed {
            return Err(Error::Forbidden(
                "You may not delete this autobiography".to_string(),
            ));
        }

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| Error::Config(format!("Invalid deletion token lifetime: {}", e)))?;
        let token = Uuid::new_v4().simple().to_string();
        let pending = PendingDeletion {
            record_id: id,
            actor_uid: actor.uid.clone(),
            expires_at: now + ttl,
        };

        let mut tokens = self.tokens.lock().await;
        tokens.retain(|_, p| p.expires_at > now);
        tokens.insert(token.clone(), pending.clone());
        drop(tokens);

        info!(
            subsystem = "api",
            component = "deletion",
            op = "request_delete",
            record_id = %id,
            owner_id = %actor.uid,
            scope = ?scope,
            "Deletion requested"
        );

        Ok(DeletionTicket {
            token,
            record_id: id,
            expires_at: pending.expires_at,
            expires_in_secs: self.ttl.as_secs(),
        })
    }

    pub async fn confirm_delete(
        &self,
        id: Uuid,
        token: Option<&str>,
        actor: &Principal,
    ) -> Result<()> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidInput("Deletion token is required".to_string()))?;

        let now = Utc::now();
        {
            let mut tokens = self.tokens.lock().await;
            let pending = tokens
                .get(token)
                .cloned()
                .ok_or_else(|| Error::Forbidden("Unknown deletion token".to_string()))?;

            if pending.expires_at <= now {
                tokens.remove(token);
                return Err(Error::Forbidden("Deletion token has expired".to_string()));
            }
            if pending.record_id != id || pending.actor_uid != actor.uid {
                warn!(
                    subsystem = "api",
                    component = "deletion",
                    op = "confirm_delete",
                    record_id = %id,
                    owner_id = %actor.uid,
                    "Deletion token does not match request"
                );
                return Err(Error::Forbidden(
                    "Deletion token does not match this request".to_string(),
                ));
            }

            tokens.remove(token);
            tokens.retain(|_, p| p.expires_at > now);
        }

        if !self.lifecycle.store()?.delete(id).await? {
            return Err(Error::RecordNotFound(id));
        }

        info!(
            subsystem = "api",
            component = "deletion",
            op = "confirm_delete",
            record_id = %id,
            owner_id = %actor.uid,
            "Autobiography deleted"
        );
        Ok(())
    }

    /// Number of outstanding tokens, expired ones included.
    pub async fn pending_count(&self) -> usize {
        self.tokens.lock().await.len()
    }
}
