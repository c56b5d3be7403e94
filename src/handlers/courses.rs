// src/handlers/courses.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{error::AppError, services::lectures, store::Store, utils::jwt::Claims};

/// Query parameters for listing courses.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub year: Option<i32>,
}

/// Lists courses, optionally filtered by academic year.
pub async fn list_courses(
    State(store): State<Arc<dyn Store>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let courses = store.list_courses(params.year).await.map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        e
    })?;

    Ok(Json(courses))
}

/// Lists a course's lectures annotated with the caller's access state
/// (locked/unlocked, lock reason, code-entry availability).
pub async fn list_course_lectures(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let views = lectures::list_course_lectures(
        store.as_ref(),
        claims.student_id(),
        claims.cohort,
        course_id,
    )
    .await?;

    Ok(Json(views))
}
