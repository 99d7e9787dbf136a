//! Application state shared across handlers.

use sqlx::PgPool;
use std::sync::Arc;
use vitrina_core::Config;
use vitrina_db::{
    AlertRepository, RuleRepository, StoreRepository, UploadDayRepository, UploadFileRepository,
};
use vitrina_drive::DriveClient;

use crate::services::email::EmailService;

/// Main application state: repositories, the Drive client, and the optional
/// email channel. Shared as `Arc<AppState>` via Axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub stores: StoreRepository,
    pub rules: RuleRepository,
    pub days: UploadDayRepository,
    pub files: UploadFileRepository,
    pub alerts: AlertRepository,
    pub drive: Arc<dyn DriveClient>,
    pub email: Option<EmailService>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
