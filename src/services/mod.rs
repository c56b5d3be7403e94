// src/services/mod.rs

pub mod homework;
pub mod lectures;
pub mod quiz;

use crate::{
    error::AppError,
    keys::ProgressKey,
    models::course::Lecture,
    store::Store,
};

/// Resolves a lecture id to the lecture and its structured progress key.
/// The year comes from the owning course, never from the client.
pub(crate) async fn locate_lecture(
    store: &dyn Store,
    lecture_id: i64,
) -> Result<(Lecture, ProgressKey), AppError> {
    let lecture = store
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    let course = store
        .find_course(lecture.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let key = ProgressKey::new(course.year, course.id, lecture.id);
    Ok((lecture, key))
}
