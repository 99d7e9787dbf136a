use sqlx::Row;
use uuid::Uuid;
use vitrina_core::models::store::{Cluster, Store};
use vitrina_core::AppError;

/// Repository for stores and clusters.
#[derive(Clone)]
pub struct StoreRepository {
    pool: sqlx::PgPool,
}

impl StoreRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a store together with its ordered required photo slots.
    #[tracing::instrument(skip(self), fields(db.table = "stores", db.record_id = %store_id))]
    pub async fn get_store(&self, store_id: Uuid) -> Result<Option<Store>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, label, cluster_id
            FROM stores
            WHERE id = $1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let photo_slots: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT slot_name
            FROM store_photo_slots
            WHERE store_id = $1
            ORDER BY position
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Store {
            id: row.get("id"),
            name: row.get("name"),
            label: row.get("label"),
            cluster_id: row.get("cluster_id"),
            photo_slots,
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "clusters", db.record_id = %cluster_id))]
    pub async fn get_cluster(&self, cluster_id: Uuid) -> Result<Option<Cluster>, AppError> {
        let row = sqlx::query_as::<_, Cluster>(
            r#"
            SELECT id, name
            FROM clusters
            WHERE id = $1
            "#,
        )
        .bind(cluster_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
