use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retail store. `photo_slots` is the ordered list of required photo slot
/// names for this store (e.g. ["ESCAPARATE", "FACHADA"]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    /// Label used for the Drive folder, usually "{code} - {name}".
    pub label: String,
    pub cluster_id: Option<Uuid>,
    pub photo_slots: Vec<String>,
}

/// A cluster of stores managed together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cluster {
    pub id: Uuid,
    pub name: String,
}
