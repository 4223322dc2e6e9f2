//! Request image repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::RequestImageEntity;
use crate::metrics::QueryTimer;

/// Input for recording a stored image.
#[derive(Debug, Clone)]
pub struct NewRequestImage<'a> {
    pub request_id: Uuid,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub storage_key: &'a str,
}

#[derive(Clone)]
pub struct RequestImageRepository {
    pool: PgPool,
}

impl RequestImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count_for_request(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_request_images");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM request_images WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn insert(
        conn: &mut PgConnection,
        image: &NewRequestImage<'_>,
    ) -> Result<RequestImageEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_request_image");
        let result = sqlx::query_as::<_, RequestImageEntity>(
            r#"
            INSERT INTO request_images
                (request_id, file_name, content_type, size_bytes, storage_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, request_id, file_name, content_type, size_bytes, storage_key, uploaded_at
            "#,
        )
        .bind(image.request_id)
        .bind(image.file_name)
        .bind(image.content_type)
        .bind(image.size_bytes)
        .bind(image.storage_key)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    pub async fn list_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<RequestImageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_request_images");
        let result = sqlx::query_as::<_, RequestImageEntity>(
            r#"
            SELECT id, request_id, file_name, content_type, size_bytes, storage_key, uploaded_at
            FROM request_images
            WHERE request_id = $1
            ORDER BY uploaded_at, id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RequestImageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_request_image_by_id");
        let result = sqlx::query_as::<_, RequestImageEntity>(
            r#"
            SELECT id, request_id, file_name, content_type, size_bytes, storage_key, uploaded_at
            FROM request_images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an image row. Returns whether it existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_request_image");
        let result = sqlx::query("DELETE FROM request_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }
}
