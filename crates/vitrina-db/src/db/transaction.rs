//! Database transaction helper.
//!
//! Multi-step mutations (version flips plus day-status recomputation) run
//! through this so a failure anywhere rolls the whole step back.

use sqlx::{PgPool, Postgres, Transaction};
use std::pin::Pin;
use vitrina_core::AppError;

/// Execute a closure within a database transaction.
///
/// Begins a transaction, runs the closure, commits on success and rolls back
/// on error.
pub async fn with_transaction<T, F>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: for<'a> FnOnce(
        &'a mut Transaction<'_, Postgres>,
    ) -> Pin<
        Box<dyn std::future::Future<Output = Result<T, AppError>> + Send + 'a>,
    >,
{
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        AppError::Database(e)
    })?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to commit transaction");
                AppError::Database(e)
            })?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    error = %rollback_err,
                    original_error = %e,
                    "Failed to rollback transaction"
                );
            }
            Err(e)
        }
    }
}
