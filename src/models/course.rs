// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    /// Academic year the course belongs to.
    pub year: i32,
    pub title: String,
}

/// Represents the 'lectures' table in the database.
///
/// `has_quiz` / `has_homework` are intentionally not columns here; they are
/// derived by counting child question rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lecture {
    pub id: i64,
    pub course_id: i64,
    /// Sort key, unique within a course.
    pub ord: i32,
    pub title: String,
    pub is_hidden: bool,
    pub video_url: Option<String>,
}

/// DTO for creating a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(range(min = 1, max = 6))]
    pub year: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

/// DTO for creating a lecture.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLectureRequest {
    pub course_id: i64,
    #[validate(range(min = 0))]
    pub ord: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[validate(length(max = 500))]
    pub video_url: Option<String>,
}
