// src/handlers/progress.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{
    error::AppError, models::progress::ProgressRecord, store::Store, utils::jwt::Claims,
};

/// Dashboard row: one progress record with its composite key, both in
/// structured form and in the legacy export encoding.
#[derive(Debug, Serialize)]
pub struct ProgressOverviewRow {
    pub key: String,
    pub year: i32,
    pub course_id: i64,
    pub lecture_id: i64,
    #[serde(flatten)]
    pub record: ProgressRecord,
}

/// Returns all of the caller's progress records for the dashboard.
pub async fn my_progress(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let rows = store.list_progress(claims.student_id()).await.map_err(|e| {
        tracing::error!("Failed to list progress: {:?}", e);
        e
    })?;

    let rows: Vec<ProgressOverviewRow> = rows
        .into_iter()
        .map(|(key, record)| ProgressOverviewRow {
            key: key.encode(),
            year: key.year,
            course_id: key.course_id,
            lecture_id: key.lecture_id,
            record,
        })
        .collect();

    Ok(Json(rows))
}
