// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Hard cap on quiz attempts per lecture. Once reached without a pass, the
/// lecture stays inaccessible pending support intervention.
pub const MAX_QUIZ_ATTEMPTS: i64 = 3;

/// Fallback quiz duration when no duration row exists for a lecture.
pub const DEFAULT_QUIZ_DURATION_MINUTES: i64 = 10;

/// Maximum number of device fingerprints a student account may accumulate.
pub const MAX_DEVICES: usize = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}
