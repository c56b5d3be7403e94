// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::{Rng, SeedableRng, distr::Alphanumeric, rngs::StdRng};
use serde::Deserialize;
use validator::Validate;

use crate::{
    domain::quiz::{ESSAY_SET, QUIZ_VARIANTS},
    error::AppError,
    keys::ProgressKey,
    models::{
        access_code::GenerateCodesRequest,
        course::{CreateCourseRequest, CreateLectureRequest},
        question::{CreateQuestionRequest, KIND_ESSAY},
    },
    store::Store,
    utils::jwt::Claims,
};

/// Creates a new course.
/// Admin only.
pub async fn create_course(
    State(store): State<Arc<dyn Store>>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let course = store.create_course(payload.year, &payload.title).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Creates a new lecture within a course.
/// Admin only.
pub async fn create_lecture(
    State(store): State<Arc<dyn Store>>,
    Json(payload): Json<CreateLectureRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    store
        .find_course(payload.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lecture = store.create_lecture(&payload).await?;
    Ok((StatusCode::CREATED, Json(lecture)))
}

/// Resolves which variant set a new quiz question lands in.
fn resolve_variant(payload: &CreateQuestionRequest) -> Result<&'static str, AppError> {
    if payload.kind == KIND_ESSAY {
        return Ok(ESSAY_SET);
    }

    let requested = payload.variant.as_deref().ok_or_else(|| {
        AppError::Validation("A target variant is required for MCQ quiz questions".to_string())
    })?;

    QUIZ_VARIANTS
        .iter()
        .copied()
        .find(|v| *v == requested)
        .ok_or_else(|| AppError::Validation(format!("Unknown variant '{}'", requested)))
}

/// Adds a question to one of a lecture's quiz variant sets (or the shared
/// essay set).
/// Admin only.
pub async fn create_quiz_question(
    State(store): State<Arc<dyn Store>>,
    Path(lecture_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    payload.check_shape()?;

    store
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    let variant = resolve_variant(&payload)?;
    let id = store
        .insert_quiz_question(lecture_id, variant, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz question: {:?}", e);
            e
        })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Adds a homework question to a lecture.
/// Admin only.
pub async fn create_homework_question(
    State(store): State<Arc<dyn Store>>,
    Path(lecture_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    payload.check_shape()?;

    store
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    let id = store
        .insert_homework_question(lecture_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create homework question: {:?}", e);
            e
        })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for the quiz duration setting.
#[derive(Debug, Deserialize, Validate)]
pub struct SetDurationRequest {
    #[validate(range(min = 1, max = 300, message = "Duration must be between 1 and 300 minutes."))]
    pub minutes: i64,
}

/// Sets the quiz countdown duration for a lecture.
/// Admin only.
pub async fn set_quiz_duration(
    State(store): State<Arc<dyn Store>>,
    Path(lecture_id): Path<i64>,
    Json(payload): Json<SetDurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    store
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    store.set_quiz_duration(lecture_id, payload.minutes).await?;
    Ok(StatusCode::OK)
}

/// Generates a batch of single-use access codes.
/// Admin only.
pub async fn generate_codes(
    State(store): State<Arc<dyn Store>>,
    Json(payload): Json<GenerateCodesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let codes: Vec<String> = {
        let mut rng = StdRng::from_os_rng();
        (0..payload.count)
            .map(|_| {
                (&mut rng)
                    .sample_iter(Alphanumeric)
                    .take(10)
                    .map(char::from)
                    .collect::<String>()
                    .to_uppercase()
            })
            .collect()
    };

    store.insert_codes(&codes).await.map_err(|e| {
        tracing::error!("Failed to insert access codes: {:?}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"codes": codes}))))
}

/// Lists all students.
/// Admin only.
pub async fn list_students(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let students = store.list_students().await.map_err(|e| {
        tracing::error!("Failed to list students: {:?}", e);
        e
    })?;

    Ok(Json(students))
}

/// DTO for the progress enable/disable override.
#[derive(Debug, Deserialize)]
pub struct SetProgressEnabledRequest {
    pub student_id: i64,
    pub year: i32,
    pub course_id: i64,
    pub lecture_id: i64,
    pub enabled: bool,
}

/// Revokes (or restores) a student's access to an already-unlocked lecture.
/// Admin only.
pub async fn set_progress_enabled(
    State(store): State<Arc<dyn Store>>,
    axum::Extension(claims): axum::Extension<Claims>,
    Json(payload): Json<SetProgressEnabledRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.student_id == claims.student_id() {
        return Err(AppError::BadRequest(
            "Cannot toggle your own progress".to_string(),
        ));
    }

    let key = ProgressKey::new(payload.year, payload.course_id, payload.lecture_id);
    store
        .set_enabled(payload.student_id, key, payload.enabled)
        .await?;

    Ok(StatusCode::OK)
}
