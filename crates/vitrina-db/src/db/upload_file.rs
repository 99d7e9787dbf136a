use uuid::Uuid;
use vitrina_core::completion::evaluate_day;
use vitrina_core::models::upload_day::UploadDay;
use vitrina_core::models::upload_file::{UploadFile, UploadKind};
use vitrina_core::versioning::promote_candidate;
use vitrina_core::AppError;

use super::transaction::with_transaction;
use super::upload_day::apply_evaluation_on;

const FILE_COLUMNS: &str = "id, day_id, kind, slot_name, version_group_id, slot_sequence, \
     version_number, is_current_version, supersedes_file_id, drive_file_id, filename, \
     original_filename, content_type, size_bytes, uploaded_by, uploaded_at";

/// Insert payload for a new file version. The repository assigns the id and
/// sets the row current, demoting any superseded sibling in the same
/// transaction.
#[derive(Debug, Clone)]
pub struct NewUploadFile {
    pub day_id: Uuid,
    pub kind: UploadKind,
    pub slot_name: Option<String>,
    pub version_group_id: Uuid,
    pub slot_sequence: i32,
    pub version_number: i32,
    pub supersedes_file_id: Option<Uuid>,
    pub drive_file_id: String,
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
}

/// Repository for upload file versions. Mutations recompute the owning day's
/// cached status in the same transaction, so a reader never observes two
/// current versions in a group or a status inconsistent with the file set.
#[derive(Clone)]
pub struct UploadFileRepository {
    pool: sqlx::PgPool,
}

impl UploadFileRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_files", db.record_id = %file_id))]
    pub async fn get_by_id(&self, file_id: Uuid) -> Result<Option<UploadFile>, AppError> {
        let row = sqlx::query_as::<_, UploadFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM upload_files WHERE id = $1"
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_files", day_id = %day_id))]
    pub async fn list_for_day(&self, day_id: Uuid) -> Result<Vec<UploadFile>, AppError> {
        let rows = sqlx::query_as::<_, UploadFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM upload_files WHERE day_id = $1 \
             ORDER BY slot_sequence, version_number"
        ))
        .bind(day_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All versions in a group, oldest first.
    #[tracing::instrument(skip(self), fields(db.table = "upload_files", group_id = %version_group_id))]
    pub async fn list_group(&self, version_group_id: Uuid) -> Result<Vec<UploadFile>, AppError> {
        let rows = sqlx::query_as::<_, UploadFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM upload_files WHERE version_group_id = $1 \
             ORDER BY version_number"
        ))
        .bind(version_group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lookup by the destination store's file id; backs idempotent finalize.
    #[tracing::instrument(skip(self), fields(db.table = "upload_files"))]
    pub async fn find_by_drive_id(
        &self,
        drive_file_id: &str,
    ) -> Result<Option<UploadFile>, AppError> {
        let row = sqlx::query_as::<_, UploadFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM upload_files WHERE drive_file_id = $1"
        ))
        .bind(drive_file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Commit a new file version: demote the superseded sibling, insert the
    /// new row as current, re-evaluate the day against the committed file
    /// set, and persist the cached status. Returns the inserted file, the
    /// refreshed day, and whether the day was sent before this commit.
    #[tracing::instrument(
        skip(self, new, required_slots),
        fields(db.table = "upload_files", day_id = %new.day_id, group_id = %new.version_group_id)
    )]
    pub async fn commit_version(
        &self,
        new: NewUploadFile,
        required_slots: &[String],
    ) -> Result<(UploadFile, UploadDay, bool), AppError> {
        let required_slots = required_slots.to_vec();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let required_slots = &required_slots;
                let day = fetch_day(tx, new.day_id).await?;
                let was_sent = day.is_sent;

                if new.supersedes_file_id.is_some() {
                    sqlx::query(
                        "UPDATE upload_files SET is_current_version = FALSE \
                         WHERE version_group_id = $1 AND is_current_version",
                    )
                    .bind(new.version_group_id)
                    .execute(&mut **tx)
                    .await?;
                }

                let file = sqlx::query_as::<_, UploadFile>(&format!(
                    r#"
                    INSERT INTO upload_files
                        (id, day_id, kind, slot_name, version_group_id, slot_sequence,
                         version_number, is_current_version, supersedes_file_id, drive_file_id,
                         filename, original_filename, content_type, size_bytes, uploaded_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9, $10, $11, $12, $13, $14)
                    RETURNING {FILE_COLUMNS}
                    "#
                ))
                .bind(Uuid::new_v4())
                .bind(new.day_id)
                .bind(new.kind)
                .bind(&new.slot_name)
                .bind(new.version_group_id)
                .bind(new.slot_sequence)
                .bind(new.version_number)
                .bind(new.supersedes_file_id)
                .bind(&new.drive_file_id)
                .bind(&new.filename)
                .bind(&new.original_filename)
                .bind(&new.content_type)
                .bind(new.size_bytes)
                .bind(new.uploaded_by)
                .fetch_one(&mut **tx)
                .await?;

                let files = fetch_day_files(tx, new.day_id).await?;
                let eval = evaluate_day(day.requirement, &files, required_slots);
                let day = apply_evaluation_on(&mut **tx, new.day_id, &eval).await?;

                Ok((file, day, was_sent))
            })
        })
        .await
    }

    /// Delete a file version. Deleting the current version promotes the
    /// next-most-recent remaining version in its group; an emptied group is
    /// left with no current file. The day's cached status is recomputed in
    /// the same transaction. Returns the deleted file, the refreshed day,
    /// and whether the day was sent before the delete.
    #[tracing::instrument(
        skip(self, required_slots),
        fields(db.table = "upload_files", db.record_id = %file_id)
    )]
    pub async fn delete_version(
        &self,
        file_id: Uuid,
        required_slots: &[String],
    ) -> Result<(UploadFile, UploadDay, bool), AppError> {
        let required_slots = required_slots.to_vec();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let required_slots = &required_slots;
                let deleted = sqlx::query_as::<_, UploadFile>(&format!(
                    "DELETE FROM upload_files WHERE id = $1 RETURNING {FILE_COLUMNS}"
                ))
                .bind(file_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Upload file {} not found", file_id)))?;

                let day = fetch_day(tx, deleted.day_id).await?;
                let was_sent = day.is_sent;

                if deleted.is_current_version {
                    let remaining = sqlx::query_as::<_, UploadFile>(&format!(
                        "SELECT {FILE_COLUMNS} FROM upload_files WHERE version_group_id = $1"
                    ))
                    .bind(deleted.version_group_id)
                    .fetch_all(&mut **tx)
                    .await?;

                    if let Some(candidate) = promote_candidate(&remaining).map(|f| f.id) {
                        sqlx::query(
                            "UPDATE upload_files SET is_current_version = TRUE WHERE id = $1",
                        )
                        .bind(candidate)
                        .execute(&mut **tx)
                        .await?;
                    }
                }

                let files = fetch_day_files(tx, deleted.day_id).await?;
                let eval = evaluate_day(day.requirement, &files, required_slots);
                let day = apply_evaluation_on(&mut **tx, deleted.day_id, &eval).await?;

                Ok((deleted, day, was_sent))
            })
        })
        .await
    }
}

async fn fetch_day(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    day_id: Uuid,
) -> Result<UploadDay, AppError> {
    sqlx::query_as::<_, UploadDay>(
        "SELECT id, store_id, day, requirement, status, is_sent, completed_at, drive_folder_id, \
         validated_by, validated_at, created_at, updated_at \
         FROM upload_days WHERE id = $1",
    )
    .bind(day_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Upload day {} not found", day_id)))
}

async fn fetch_day_files(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    day_id: Uuid,
) -> Result<Vec<UploadFile>, AppError> {
    let rows = sqlx::query_as::<_, UploadFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM upload_files WHERE day_id = $1"
    ))
    .bind(day_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}
