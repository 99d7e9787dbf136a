use chrono::NaiveDate;
use uuid::Uuid;
use vitrina_core::completion::DayEvaluation;
use vitrina_core::models::requirement::RequirementKind;
use vitrina_core::models::upload_day::UploadDay;
use vitrina_core::AppError;

const DAY_COLUMNS: &str = "id, store_id, day, requirement, status, is_sent, completed_at, \
     drive_folder_id, validated_by, validated_at, created_at, updated_at";

/// Repository for upload days. One row per (store, calendar date); the
/// requirement is frozen at creation and the cached status fields are
/// refreshed on every file mutation.
#[derive(Clone)]
pub struct UploadDayRepository {
    pool: sqlx::PgPool,
}

impl UploadDayRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_days", db.record_id = %day_id))]
    pub async fn get_by_id(&self, day_id: Uuid) -> Result<Option<UploadDay>, AppError> {
        let row = sqlx::query_as::<_, UploadDay>(&format!(
            "SELECT {DAY_COLUMNS} FROM upload_days WHERE id = $1"
        ))
        .bind(day_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_days", store_id = %store_id, %day))]
    pub async fn get_by_store_date(
        &self,
        store_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<UploadDay>, AppError> {
        let row = sqlx::query_as::<_, UploadDay>(&format!(
            "SELECT {DAY_COLUMNS} FROM upload_days WHERE store_id = $1 AND day = $2"
        ))
        .bind(store_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create the day row, freezing the resolved requirement. A concurrent
    /// creation for the same (store, day) loses the insert race and returns
    /// the winner's row instead.
    #[tracing::instrument(skip(self), fields(db.table = "upload_days", store_id = %store_id, %day))]
    pub async fn create(
        &self,
        store_id: Uuid,
        day: NaiveDate,
        requirement: RequirementKind,
    ) -> Result<UploadDay, AppError> {
        let initial_sent = requirement == RequirementKind::None;
        let inserted = sqlx::query_as::<_, UploadDay>(&format!(
            r#"
            INSERT INTO upload_days (id, store_id, day, requirement, status, is_sent, completed_at)
            VALUES ($1, $2, $3, $4,
                    CASE WHEN $5 THEN 'complete'::day_status ELSE 'pending'::day_status END,
                    $5,
                    CASE WHEN $5 THEN NOW() ELSE NULL END)
            ON CONFLICT (store_id, day) DO NOTHING
            RETURNING {DAY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(day)
        .bind(requirement)
        .bind(initial_sent)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            None => self
                .get_by_store_date(store_id, day)
                .await?
                .ok_or_else(|| AppError::Internal("Upload day vanished after insert race".into())),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_days", db.record_id = %day_id))]
    pub async fn set_drive_folder(&self, day_id: Uuid, folder_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE upload_days SET drive_folder_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(day_id)
            .bind(folder_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Persist an evaluation onto the cached day fields. `completed_at` is
    /// set on the transition into sent, kept while the day stays sent, and
    /// cleared when the day falls out of sent.
    pub async fn apply_evaluation(
        &self,
        day_id: Uuid,
        eval: &DayEvaluation,
    ) -> Result<UploadDay, AppError> {
        apply_evaluation_on(&self.pool, day_id, eval).await
    }

    /// Mark the day validated by an administrator.
    #[tracing::instrument(skip(self), fields(db.table = "upload_days", db.record_id = %day_id))]
    pub async fn validate(&self, day_id: Uuid, validated_by: Uuid) -> Result<UploadDay, AppError> {
        let row = sqlx::query_as::<_, UploadDay>(&format!(
            r#"
            UPDATE upload_days
            SET validated_by = $2, validated_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {DAY_COLUMNS}
            "#
        ))
        .bind(day_id)
        .bind(validated_by)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| AppError::NotFound(format!("Upload day {} not found", day_id)))
    }

    /// Explicit administrative un-send: clears validation, `is_sent` and
    /// `completed_at`. The status field self-heals on the next evaluation.
    #[tracing::instrument(skip(self), fields(db.table = "upload_days", db.record_id = %day_id))]
    pub async fn unvalidate(&self, day_id: Uuid) -> Result<UploadDay, AppError> {
        let row = sqlx::query_as::<_, UploadDay>(&format!(
            r#"
            UPDATE upload_days
            SET validated_by = NULL, validated_at = NULL,
                is_sent = FALSE, completed_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {DAY_COLUMNS}
            "#
        ))
        .bind(day_id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| AppError::NotFound(format!("Upload day {} not found", day_id)))
    }
}

/// Shared evaluation update, usable on a pool or inside an open transaction
/// so file mutations commit their status change atomically.
pub(crate) async fn apply_evaluation_on<'e, E>(
    executor: E,
    day_id: Uuid,
    eval: &DayEvaluation,
) -> Result<UploadDay, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UploadDay>(&format!(
        r#"
        UPDATE upload_days
        SET status = $2,
            is_sent = $3,
            completed_at = CASE
                WHEN $3 AND NOT is_sent THEN NOW()
                WHEN NOT $3 THEN NULL
                ELSE completed_at
            END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {DAY_COLUMNS}
        "#
    ))
    .bind(day_id)
    .bind(eval.status)
    .bind(eval.is_sent)
    .fetch_optional(executor)
    .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Upload day {} not found", day_id)))
}
