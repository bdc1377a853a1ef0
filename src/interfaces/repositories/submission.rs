use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::contact::{SubmissionId, SubmissionRecord},
    errors::AppError,
    repositories::sqlx_repo::SqlxSubmissionRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn save(&self, record: &SubmissionRecord) -> Result<SubmissionId, AppError>;
}

impl SqlxSubmissionRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxSubmissionRepo { pool }
    }
}

#[async_trait]
impl SubmissionRepository for SqlxSubmissionRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn save(&self, record: &SubmissionRecord) -> Result<SubmissionId, AppError> {
        // Returned to the pool when dropped, on every exit path.
        let mut conn = self.pool.acquire().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO contact_submissions (name, email, interest, message, submitted_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(record.name())
        .bind(record.email())
        .bind(record.interest().as_str())
        .bind(record.message())
        .bind(record.submitted_at())
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }
}
