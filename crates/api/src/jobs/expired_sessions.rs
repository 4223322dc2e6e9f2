//! Removal of expired login sessions.

use persistence::repositories::SessionRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

pub struct ExpiredSessionsJob {
    sessions: SessionRepository,
}

impl ExpiredSessionsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sessions: SessionRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpiredSessionsJob {
    fn name(&self) -> &'static str {
        "expired_sessions"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(30)
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let deleted = self.sessions.delete_expired().await?;
        if deleted > 0 {
            info!(deleted, "Removed expired sessions");
        }
        Ok(())
    }
}
