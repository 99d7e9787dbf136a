//! Configuration module
//!
//! Environment-driven configuration for the API and services: database,
//! authentication, upload protocol limits, Google Drive access, and SMTP.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const FINALIZE_TOKEN_TTL_MINUTES: i64 = 30;
const UPLOAD_WINDOW_DAYS: i64 = 7;
const MAX_CHUNK_BYTES: usize = 2 * 1024 * 1024;
const MAX_VIDEO_SIZE_MB: usize = 500;
const MAX_PHOTO_SIZE_MB: usize = 15;

/// Application configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    cors_origins: Vec<String>,
    environment: String,
    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,
    jwt_secret: String,
    jwt_expiry_hours: i64,
    finalize_token_secret: String,
    finalize_token_ttl_minutes: i64,
    upload_window_days: i64,
    max_chunk_bytes: usize,
    max_video_size_bytes: usize,
    max_photo_size_bytes: usize,
    drive_root_folder_id: String,
    drive_api_base: String,
    drive_upload_base: String,
    drive_access_token: Option<String>,
    email_alerts_enabled: bool,
    alert_recipients: Vec<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    smtp_from: Option<String>,
    smtp_tls: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            finalize_token_secret: env::var("FINALIZE_TOKEN_SECRET")
                .or_else(|_| env::var("JWT_SECRET"))
                .map_err(|_| anyhow::anyhow!("FINALIZE_TOKEN_SECRET must be set"))?,
            finalize_token_ttl_minutes: env::var("FINALIZE_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| FINALIZE_TOKEN_TTL_MINUTES.to_string())
                .parse()
                .unwrap_or(FINALIZE_TOKEN_TTL_MINUTES),
            upload_window_days: env::var("UPLOAD_WINDOW_DAYS")
                .unwrap_or_else(|_| UPLOAD_WINDOW_DAYS.to_string())
                .parse()
                .unwrap_or(UPLOAD_WINDOW_DAYS),
            max_chunk_bytes: env::var("MAX_CHUNK_BYTES")
                .unwrap_or_else(|_| MAX_CHUNK_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_CHUNK_BYTES),
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_MB")
                .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_VIDEO_SIZE_MB)
                * 1024
                * 1024,
            max_photo_size_bytes: env::var("MAX_PHOTO_SIZE_MB")
                .unwrap_or_else(|_| MAX_PHOTO_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_PHOTO_SIZE_MB)
                * 1024
                * 1024,
            drive_root_folder_id: env::var("DRIVE_ROOT_FOLDER_ID")
                .map_err(|_| anyhow::anyhow!("DRIVE_ROOT_FOLDER_ID must be set"))?,
            drive_api_base: env::var("DRIVE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".to_string()),
            drive_upload_base: env::var("DRIVE_UPLOAD_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/upload/drive/v3".to_string()),
            drive_access_token: env::var("DRIVE_ACCESS_TOKEN").ok(),
            email_alerts_enabled: env::var("EMAIL_ALERTS_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            alert_recipients: env::var("ALERT_RECIPIENTS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|s| s.parse().ok()),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from: env::var("SMTP_FROM").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }
        if self.finalize_token_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "FINALIZE_TOKEN_SECRET must be at least 32 characters long"
            ));
        }
        if self.upload_window_days < 0 {
            return Err(anyhow::anyhow!("UPLOAD_WINDOW_DAYS cannot be negative"));
        }
        if self.max_chunk_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_CHUNK_BYTES must be greater than 0"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.jwt_expiry_hours
    }

    pub fn finalize_token_secret(&self) -> &[u8] {
        self.finalize_token_secret.as_bytes()
    }

    pub fn finalize_token_ttl_minutes(&self) -> i64 {
        self.finalize_token_ttl_minutes
    }

    pub fn upload_window_days(&self) -> i64 {
        self.upload_window_days
    }

    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.max_video_size_bytes
    }

    pub fn max_photo_size_bytes(&self) -> usize {
        self.max_photo_size_bytes
    }

    pub fn drive_root_folder_id(&self) -> &str {
        &self.drive_root_folder_id
    }

    pub fn drive_api_base(&self) -> &str {
        &self.drive_api_base
    }

    pub fn drive_upload_base(&self) -> &str {
        &self.drive_upload_base
    }

    pub fn drive_access_token(&self) -> Option<&str> {
        self.drive_access_token.as_deref()
    }

    pub fn email_alerts_enabled(&self) -> bool {
        self.email_alerts_enabled
    }

    pub fn alert_recipients(&self) -> &[String] {
        &self.alert_recipients
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.smtp_tls
    }
}
