// src/models/access_code.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'access_codes' table in the database.
///
/// A code transitions unused -> used exactly once; the consumer identity and
/// target lecture are recorded at redemption time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessCode {
    pub id: i64,
    pub code: String,
    pub is_used: bool,
    pub used_by: Option<i64>,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub year: Option<i32>,
    pub course_id: Option<i64>,
    pub lecture_id: Option<i64>,
}

/// DTO for redeeming a code against a lecture.
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemCodeRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub lecture_id: i64,
}

/// DTO for admin batch code generation.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateCodesRequest {
    #[validate(range(min = 1, max = 500))]
    pub count: u32,
}
