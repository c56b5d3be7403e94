// src/handlers/quiz.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;

use crate::{error::AppError, services::quiz, store::Store, utils::jwt::Claims};

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// Selected option index per MCQ question id.
    #[serde(default)]
    pub answers: HashMap<i64, i32>,
    /// Essay text per question id, stored verbatim (ungraded).
    #[serde(default)]
    pub essay_answers: BTreeMap<i64, String>,
}

/// Starts (or resumes) a quiz attempt for a lecture.
///
/// Serves the question set of a rotated variant without correct answers,
/// together with the remaining time on the countdown.
pub async fn start_attempt(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(lecture_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut rng = StdRng::from_os_rng();

    let session = quiz::start_attempt(
        store.as_ref(),
        &mut rng,
        claims.student_id(),
        lecture_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(session))
}

/// Submits a quiz attempt and returns the scored outcome. The timer-zero
/// auto-submit from the client lands here too.
pub async fn submit_attempt(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(lecture_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = quiz::submit_attempt(
        store.as_ref(),
        claims.student_id(),
        lecture_id,
        &req.answers,
        &req.essay_answers,
        Utc::now(),
    )
    .await?;

    Ok(Json(outcome))
}
