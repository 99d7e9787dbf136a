//! Service initialization and application state setup

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use vitrina_core::Config;
use vitrina_db::{
    AlertRepository, RuleRepository, StoreRepository, UploadDayRepository, UploadFileRepository,
};
use vitrina_drive::HttpDriveClient;

use crate::services::email::EmailService;
use crate::state::AppState;

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let access_token = config
        .drive_access_token()
        .ok_or_else(|| anyhow::anyhow!("DRIVE_ACCESS_TOKEN must be set"))?;
    let drive = HttpDriveClient::new(
        config.drive_api_base(),
        config.drive_upload_base(),
        access_token,
    );

    let email = EmailService::from_config(config);
    if email.is_none() {
        tracing::info!("Email alerts disabled or SMTP not configured");
    }

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        stores: StoreRepository::new(pool.clone()),
        rules: RuleRepository::new(pool.clone()),
        days: UploadDayRepository::new(pool.clone()),
        files: UploadFileRepository::new(pool.clone()),
        alerts: AlertRepository::new(pool),
        drive: Arc::new(drive),
        email,
    };

    tracing::info!("Services initialized");
    Ok(Arc::new(state))
}
