//! Dashboard and admin listings.
//!
//! Each call is a fresh fetch from the store; nothing is cached between loads.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use memoir_core::{AdminStats, Error, Principal, RecordSummary, Result, SummaryView};

use super::lifecycle::RecordLifecycle;

/// Admin surface payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub autobiographies: Vec<RecordSummary>,
    pub stats: AdminStats,
}

pub struct ListingService {
    lifecycle: Arc<RecordLifecycle>,
}

impl ListingService {
    pub fn new(lifecycle: Arc<RecordLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// The actor's own records as dashboard rows.
    pub async fn dashboard(&self, actor: &Principal) -> Result<Vec<RecordSummary>> {
        let records = self.lifecycle.load(&actor.uid).await?;
        Ok(records
            .iter()
            .map(|r| RecordSummary::project(r, SummaryView::Dashboard))
            .collect())
    }

    /// Every record plus aggregate counters. Admin only.
    pub async fn admin(&self, actor: &Principal) -> Result<AdminView> {
        if !actor.is_admin {
            return Err(Error::Forbidden("Admin role required".to_string()));
        }
        let records = self.lifecycle.store()?.list_all().await?;
        let stats = AdminStats::from_records(&records);
        debug!(
            subsystem = "api",
            component = "listing",
            op = "admin",
            owner_id = %actor.uid,
            result_count = records.len(),
            total_users = stats.total_users,
            "Loaded admin listing"
        );
        Ok(AdminView {
            autobiographies: records
                .iter()
                .map(|r| RecordSummary::project(r, SummaryView::Admin))
                .collect(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::{AutobiographyRecord, RecordRepository};
    use memoir_db::MemoryRecordRepository;

    async fn seeded() -> ListingService {
        let store = Arc::new(MemoryRecordRepository::new());
        for (owner, name, title) in [("u1", "Ada", "Engines"), ("u1", "", ""), ("u2", "Bob", "Bob")] {
            let mut record = AutobiographyRecord::new_draft(owner);
            record.personal_info.name = name.to_string();
            record.customization.title = title.to_string();
            store.insert(&record).await.unwrap();
        }
        let store: Arc<dyn RecordRepository> = store;
        ListingService::new(Arc::new(RecordLifecycle::new(Some(store), None)))
    }

    #[tokio::test]
    async fn test_dashboard_is_owner_scoped_with_fallbacks() {
        let listing = seeded().await;
        let rows = listing.dashboard(&Principal::user("u1")).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Engines");
        assert_eq!(rows[1].title, "Untitled Autobiography");
        assert_eq!(rows[1].owner_name, "No name");
        assert!(listing.dashboard(&Principal::user("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_counts_distinct_owners() {
        let listing = seeded().await;
        let view = listing.admin(&Principal::admin("root")).await.unwrap();
        assert_eq!(view.stats.total_users, 2);
        assert_eq!(view.stats.total_autobiographies, 3);
        assert_eq!(view.autobiographies[1].title, "Untitled");
        assert_eq!(view.autobiographies[1].owner_name, "Unknown");
    }

    #[tokio::test]
    async fn test_admin_requires_role() {
        let listing = seeded().await;
        assert!(matches!(
            listing.admin(&Principal::user("u1")).await,
            Err(Error::Forbidden(_))
        ));
    }
}
