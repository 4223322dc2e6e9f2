//! Purge of long-completed repair requests.

use chrono::{Duration, Utc};
use persistence::repositories::RepairRequestRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_requests_purged;
use crate::services::storage::{remove_all, ImageStorage};

/// Deletes `done` requests older than the retention window, together with
/// their images, audit history and stored files.
pub struct PurgeCompletedRequestsJob {
    requests: RepairRequestRepository,
    storage: Arc<dyn ImageStorage>,
    retention_days: u32,
}

impl PurgeCompletedRequestsJob {
    pub fn new(pool: PgPool, storage: Arc<dyn ImageStorage>, retention_days: u32) -> Self {
        Self {
            requests: RepairRequestRepository::new(pool),
            storage,
            retention_days,
        }
    }

    fn cutoff(&self) -> chrono::DateTime<Utc> {
        Utc::now() - Duration::days(i64::from(self.retention_days))
    }
}

#[async_trait::async_trait]
impl Job for PurgeCompletedRequestsJob {
    fn name(&self) -> &'static str {
        "purge_completed_requests"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let purged = self.requests.delete_completed_before(self.cutoff()).await?;

        // Rows are gone at this point; leftover files are only logged.
        remove_all(self.storage.as_ref(), &purged.storage_keys).await;
        record_requests_purged(purged.deleted);

        if purged.deleted > 0 {
            info!(
                deleted = purged.deleted,
                files = purged.storage_keys.len(),
                retention_days = self.retention_days,
                "Purged completed requests"
            );
        }
        Ok(())
    }
}
