// src/store/mod.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    keys::ProgressKey,
    models::{
        course::{Course, CreateLectureRequest, Lecture},
        homework::{HomeworkDraft, HomeworkRecord},
        progress::{AnswerSnapshot, AttemptTimer, ProgressRecord},
        question::{CreateQuestionRequest, HomeworkQuestion, QuizQuestion},
        student::{NewStudent, Student},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Marks must be sane before they are persisted: non-negative and earned
/// within the possible total.
pub(crate) fn validate_marks(earned: i64, total: i64) -> Result<(), AppError> {
    if earned < 0 || total < 0 || earned > total {
        return Err(AppError::Validation(format!(
            "Invalid marks: {} of {}",
            earned, total
        )));
    }
    Ok(())
}

#[async_trait]
pub trait StudentStore {
    async fn insert_student(&self, new: NewStudent) -> Result<Student, AppError>;
    async fn find_student(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
    async fn list_students(&self) -> Result<Vec<Student>, AppError>;
    async fn update_devices(&self, id: i64, devices: &[String]) -> Result<(), AppError>;
}

#[async_trait]
pub trait CatalogStore {
    async fn create_course(&self, year: i32, title: &str) -> Result<Course, AppError>;
    async fn list_courses(&self, year: Option<i32>) -> Result<Vec<Course>, AppError>;
    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError>;

    async fn create_lecture(&self, req: &CreateLectureRequest) -> Result<Lecture, AppError>;
    /// Lectures of a course ordered by `ord`.
    async fn list_lectures(&self, course_id: i64) -> Result<Vec<Lecture>, AppError>;
    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>, AppError>;

    async fn insert_quiz_question(
        &self,
        lecture_id: i64,
        variant: &str,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError>;
    async fn insert_homework_question(
        &self,
        lecture_id: i64,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError>;

    /// Questions of one variant set (or the shared essay set), in position
    /// order.
    async fn quiz_questions(
        &self,
        lecture_id: i64,
        variant: &str,
    ) -> Result<Vec<QuizQuestion>, AppError>;
    /// MCQ counts per variant; the basis for the derived `has_quiz` flag and
    /// for variant rotation.
    async fn quiz_variant_counts(&self, lecture_id: i64) -> Result<HashMap<String, i64>, AppError>;
    async fn homework_questions(&self, lecture_id: i64)
        -> Result<Vec<HomeworkQuestion>, AppError>;

    async fn get_quiz_duration(&self, lecture_id: i64) -> Result<Option<i64>, AppError>;
    async fn set_quiz_duration(&self, lecture_id: i64, minutes: i64) -> Result<(), AppError>;
}

/// Read/write of per-student, per-lecture progress. All writes are
/// merge-upserts: unrelated fields are never clobbered, and a missing row
/// reads as `ProgressRecord::default()`.
#[async_trait]
pub trait ProgressStore {
    async fn get_progress(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<ProgressRecord, AppError>;
    async fn list_progress(
        &self,
        student_id: i64,
    ) -> Result<Vec<(ProgressKey, ProgressRecord)>, AppError>;

    async fn mark_quiz_complete(
        &self,
        student_id: i64,
        key: ProgressKey,
        earned: i64,
        total: i64,
    ) -> Result<(), AppError>;
    async fn unlock_lecture(&self, student_id: i64, key: ProgressKey) -> Result<(), AppError>;
    /// Atomically bumps `attempts`, appends the variant to `used_variants`
    /// and sets `last_variant_used`; initializes the record with
    /// `attempts = 1` when absent.
    async fn increment_attempt(
        &self,
        student_id: i64,
        key: ProgressKey,
        variant: &str,
    ) -> Result<(), AppError>;
    /// Pass path: mark-complete + unlock + answer snapshot in one atomic
    /// write, so a crash cannot leave a completed-but-locked record.
    async fn complete_and_unlock(
        &self,
        student_id: i64,
        key: ProgressKey,
        earned: i64,
        total: i64,
        answers: &AnswerSnapshot,
    ) -> Result<(), AppError>;
    async fn set_enabled(
        &self,
        student_id: i64,
        key: ProgressKey,
        enabled: bool,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait TimerStore {
    async fn get_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
    ) -> Result<Option<AttemptTimer>, AppError>;
    async fn put_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
        timer: AttemptTimer,
    ) -> Result<(), AppError>;
    /// Returns whether a record existed. Deleting the timer is the
    /// single-flight gate for submission.
    async fn delete_timer(&self, student_id: i64, lecture_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait HomeworkStore {
    async fn get_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkDraft>, AppError>;
    async fn save_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
        draft: &HomeworkDraft,
    ) -> Result<(), AppError>;
    async fn delete_draft(&self, student_id: i64, key: ProgressKey) -> Result<bool, AppError>;

    async fn get_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkRecord>, AppError>;
    async fn insert_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
        record: &HomeworkRecord,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait CodeStore {
    async fn insert_codes(&self, codes: &[String]) -> Result<(), AppError>;
    /// Consumes the code and unlocks the target lecture in one transaction.
    /// Fails with NotFound for an unknown code and Conflict for a used one,
    /// leaving no partial state either way.
    async fn redeem_code(
        &self,
        code: &str,
        student_id: i64,
        key: ProgressKey,
        now: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// The full persistence seam. Handlers and services depend on this, so
/// tests can swap in `MemoryStore`.
pub trait Store:
    StudentStore + CatalogStore + ProgressStore + TimerStore + HomeworkStore + CodeStore + Send + Sync
{
}

impl<T> Store for T where
    T: StudentStore
        + CatalogStore
        + ProgressStore
        + TimerStore
        + HomeworkStore
        + CodeStore
        + Send
        + Sync
{
}
