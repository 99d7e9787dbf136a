//! Application setup and initialization
//!
//! Startup logic extracted from main.rs: configuration validation, telemetry,
//! the database pool, service wiring, and the router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vitrina_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration before opening any connection.
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production());
    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let state = services::initialize_services(&config, pool)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
