// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Student cohort. Gates how lectures unlock:
/// `school` follows the completion chain only, `center`/`online` additionally
/// redeem an access code per lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cohort", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Center,
    Online,
    School,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Center => "center",
            Cohort::Online => "online",
            Cohort::School => "school",
        }
    }
}

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    pub name: String,

    /// Unique login identity.
    pub email: String,

    pub phone: Option<String>,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// 'student' or 'admin'.
    pub role: String,

    pub cohort: Cohort,

    pub enrolled_year: i32,

    /// Device fingerprints seen at login, capped at `MAX_DEVICES`.
    pub devices: sqlx::types::Json<Vec<String>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Fields needed to insert a new student row.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub cohort: Cohort,
    pub enrolled_year: i32,
}

/// DTO for student registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Name length must be between 2 and 100 characters."
    ))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    pub cohort: Cohort,
    #[validate(range(min = 1, max = 6, message = "Enrolled year must be between 1 and 6."))]
    pub enrolled_year: i32,
}

/// DTO for student login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// Browser/device fingerprint for the device-limit check.
    #[validate(length(max = 128))]
    pub device_id: Option<String>,
}
