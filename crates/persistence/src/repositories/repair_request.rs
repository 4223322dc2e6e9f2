//! Repair request repository for database operations.
//!
//! Reads that feed a state transition go through [`RepairRequestRepository::lock`]
//! inside a caller-owned transaction so each transition is one atomic
//! read-modify-write of a single row.

use chrono::{DateTime, Utc};
use domain::models::RepairRequest;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{RepairRequestEntity, RequestStatusDb, RequestTypeDb};
use crate::metrics::QueryTimer;

const REQUEST_COLUMNS: &str = "id, code, owner_id, name, type_request, description, \
    location_unit_id, room_number, entrance_number, status, rejection_comment, \
    assigned_master_name, assigned_master_company, assigned_master_phone, \
    assigned_company_phone, work_date, user_confirmed, completed_at, created_at, updated_at";

/// Unique constraint on the public request code.
pub const CODE_CONSTRAINT: &str = "repair_requests_code_key";

/// Input for creating a request.
#[derive(Debug, Clone)]
pub struct NewRepairRequest<'a> {
    pub owner_id: Uuid,
    pub name: &'a str,
    pub type_request: RequestTypeDb,
    pub description: &'a str,
    pub location_unit_id: i64,
    pub room_number: Option<&'a str>,
    pub entrance_number: Option<&'a str>,
}

/// Filters for listing requests.
#[derive(Debug, Clone, Default)]
pub struct RequestListFilter {
    /// Restrict to one owner's requests.
    pub owner_id: Option<Uuid>,
    /// Exclude `empty` and `rejected` requests.
    pub hide_unsubmitted: bool,
    pub status: Option<RequestStatusDb>,
    pub type_request: Option<RequestTypeDb>,
    /// Substring of name (case-insensitive) or code.
    pub query: Option<String>,
}

/// Requests removed by the retention job.
#[derive(Debug, Clone, Default)]
pub struct PurgedRequests {
    pub deleted: u64,
    /// Storage keys of the images that belonged to the deleted requests.
    pub storage_keys: Vec<String>,
}

/// Escapes LIKE wildcards in user input.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Repository for repair request database operations.
#[derive(Clone)]
pub struct RepairRequestRepository {
    pool: PgPool,
}

impl RepairRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a request under a freshly generated code.
    ///
    /// Codes are random, so a collision on the unique constraint triggers a
    /// retry with a new code, up to `attempts` times.
    pub async fn create(
        &self,
        new: &NewRepairRequest<'_>,
        attempts: u32,
    ) -> Result<RepairRequestEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO repair_requests
                (code, owner_id, name, type_request, description, location_unit_id,
                 room_number, entrance_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            let code = shared::crypto::generate_request_code();

            let timer = QueryTimer::new("create_repair_request");
            let result = sqlx::query_as::<_, RepairRequestEntity>(&sql)
                .bind(&code)
                .bind(new.owner_id)
                .bind(new.name)
                .bind(new.type_request)
                .bind(new.description)
                .bind(new.location_unit_id)
                .bind(new.room_number)
                .bind(new.entrance_number)
                .fetch_one(&self.pool)
                .await;
            timer.record();

            match result {
                Err(e)
                    if crate::is_unique_violation(&e, Some(CODE_CONSTRAINT))
                        && attempt < attempts =>
                {
                    tracing::debug!(code = %code, attempt, "Request code collision, retrying");
                }
                other => return other,
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RepairRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_repair_request_by_id");
        let result = sqlx::query_as::<_, RepairRequestEntity>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM repair_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Loads a request and locks its row until the transaction ends.
    pub async fn lock(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<RepairRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_repair_request");
        let result = sqlx::query_as::<_, RepairRequestEntity>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM repair_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Writes every mutable column of `request`.
    pub async fn update(
        conn: &mut PgConnection,
        request: &RepairRequest,
    ) -> Result<RepairRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_repair_request");
        let result = sqlx::query_as::<_, RepairRequestEntity>(&format!(
            r#"
            UPDATE repair_requests SET
                name = $2,
                type_request = $3,
                description = $4,
                location_unit_id = $5,
                room_number = $6,
                entrance_number = $7,
                status = $8,
                rejection_comment = $9,
                assigned_master_name = $10,
                assigned_master_company = $11,
                assigned_master_phone = $12,
                assigned_company_phone = $13,
                work_date = $14,
                user_confirmed = $15,
                completed_at = $16,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request.id)
        .bind(&request.name)
        .bind(RequestTypeDb::from(request.type_request))
        .bind(&request.description)
        .bind(request.location_unit_id)
        .bind(&request.room_number)
        .bind(&request.entrance_number)
        .bind(RequestStatusDb::from(request.status))
        .bind(&request.rejection_comment)
        .bind(&request.assigned_master_name)
        .bind(&request.assigned_master_company)
        .bind(&request.assigned_master_phone)
        .bind(&request.assigned_company_phone)
        .bind(request.work_date)
        .bind(request.user_confirmed)
        .bind(request.completed_at)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Whether the owner already has an in-flight request with the same content.
    pub async fn has_in_flight_duplicate(
        &self,
        new: &NewRepairRequest<'_>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("find_duplicate_repair_request");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM repair_requests
                WHERE owner_id = $1
                  AND name = $2
                  AND description = $3
                  AND location_unit_id = $4
                  AND room_number IS NOT DISTINCT FROM $5
                  AND status IN ('empty', 'pending', 'approved', 'on_check')
            )
            "#,
        )
        .bind(new.owner_id)
        .bind(new.name)
        .bind(new.description)
        .bind(new.location_unit_id)
        .bind(new.room_number)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists requests matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &RequestListFilter,
    ) -> Result<Vec<RepairRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_repair_requests");
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);

        let result = sqlx::query_as::<_, RepairRequestEntity>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM repair_requests
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND (NOT $2 OR status NOT IN ('empty', 'rejected'))
              AND ($3::request_status IS NULL OR status = $3)
              AND ($4::request_type IS NULL OR type_request = $4)
              AND ($5::text IS NULL OR name ILIKE $5 OR code LIKE $5)
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(filter.owner_id)
        .bind(filter.hide_unsubmitted)
        .bind(filter.status)
        .bind(filter.type_request)
        .bind(query)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes `done` requests completed before `cutoff`, with their images
    /// and audit rows (by cascade).
    pub async fn delete_completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<PurgedRequests, sqlx::Error> {
        let timer = QueryTimer::new("delete_completed_repair_requests");
        let mut tx = self.pool.begin().await?;

        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM repair_requests
            WHERE status = 'done' AND completed_at < $1
            FOR UPDATE
            "#,
        )
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await?;

        let storage_keys = sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM request_images WHERE request_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM repair_requests WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();

        Ok(PurgedRequests {
            deleted,
            storage_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("04"), "%04%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
