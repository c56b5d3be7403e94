// src/handlers/homework.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::AppError,
    models::homework::{SaveDraftRequest, SubmitHomeworkRequest},
    services::homework,
    store::Store,
    utils::jwt::Claims,
};

/// Opens the homework form: questions plus any restorable draft.
/// Blocked with 409 once the homework has been submitted.
pub async fn start_homework(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(lecture_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = homework::start_homework(store.as_ref(), claims.student_id(), lecture_id).await?;
    Ok(Json(view))
}

/// Autosave endpoint for in-progress answers. The client debounces; the
/// server just upserts, skipping writes when everything is still empty.
pub async fn save_draft(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(lecture_id): Path<i64>,
    Json(req): Json<SaveDraftRequest>,
) -> Result<impl IntoResponse, AppError> {
    let saved = homework::save_draft(
        store.as_ref(),
        claims.student_id(),
        lecture_id,
        req,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({ "saved": saved })))
}

/// Final, one-shot homework submission.
pub async fn submit_homework(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(lecture_id): Path<i64>,
    Json(req): Json<SubmitHomeworkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = homework::submit_homework(
        store.as_ref(),
        claims.student_id(),
        lecture_id,
        req,
        Utc::now(),
    )
    .await?;

    Ok(Json(outcome))
}
