// src/handlers/codes.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::access_code::RedeemCodeRequest,
    services::lectures,
    store::Store,
    utils::jwt::Claims,
};

/// Redeems a single-use access code against a lecture.
///
/// First use unlocks the lecture for the caller; any further use of the
/// same code fails with 409 and unlocks nothing.
pub async fn redeem(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RedeemCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    lectures::redeem_code(
        store.as_ref(),
        claims.student_id(),
        payload.lecture_id,
        &payload.code,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({ "message": "Lecture unlocked" })))
}
