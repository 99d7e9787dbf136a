use chrono::NaiveDate;
use uuid::Uuid;
use vitrina_core::AppError;

/// Repository for missing-upload alerts. Alerts are raised by an external
/// schedule; the core only clears them once the day's requirement is met.
#[derive(Clone)]
pub struct AlertRepository {
    pool: sqlx::PgPool,
}

impl AlertRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Clear any open missing-upload alert for (store, day). Returns the
    /// number of alerts cleared.
    #[tracing::instrument(skip(self), fields(db.table = "missing_upload_alerts", store_id = %store_id, %day))]
    pub async fn clear_missing_upload(
        &self,
        store_id: Uuid,
        day: NaiveDate,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE missing_upload_alerts SET cleared_at = NOW() \
             WHERE store_id = $1 AND day = $2 AND cleared_at IS NULL",
        )
        .bind(store_id)
        .bind(day)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
