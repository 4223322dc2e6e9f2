//! Request audit log repository.

use domain::models::FieldChange;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::RequestAuditLogEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records one row per change, in the caller's transaction.
    pub async fn record_changes(
        conn: &mut PgConnection,
        request_id: Uuid,
        actor_id: Option<Uuid>,
        changes: &[FieldChange],
    ) -> Result<u64, sqlx::Error> {
        if changes.is_empty() {
            return Ok(0);
        }

        let timer = QueryTimer::new("insert_request_audit_logs");
        let mut inserted = 0;
        for change in changes {
            inserted += sqlx::query(
                r#"
                INSERT INTO request_audit_logs (request_id, actor_id, field, old_value, new_value)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(request_id)
            .bind(actor_id)
            .bind(&change.field)
            .bind(&change.old_value)
            .bind(&change.new_value)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }
        timer.record();
        Ok(inserted)
    }

    /// History of a request, oldest first.
    pub async fn list_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<RequestAuditLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_request_audit_logs");
        let result = sqlx::query_as::<_, RequestAuditLogEntity>(
            r#"
            SELECT id, request_id, actor_id, field, old_value, new_value, changed_at
            FROM request_audit_logs
            WHERE request_id = $1
            ORDER BY changed_at, id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
