// src/services/lectures.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::access::{AccessDecision, PriorLectureState, resolve_access},
    error::AppError,
    models::{progress::ProgressRecord, student::Cohort},
    services::locate_lecture,
    store::Store,
};

/// A lecture row annotated with the caller's access state, as shown on the
/// course page.
#[derive(Debug, Serialize)]
pub struct LectureAccessView {
    pub id: i64,
    pub ord: i32,
    pub title: String,
    pub video_url: Option<String>,
    pub has_quiz: bool,
    pub has_homework: bool,
    pub quiz_completed: bool,
    pub homework_completed: bool,
    pub earned_marks: i64,
    pub total_marks: i64,
    pub attempts: i64,
    pub locked: bool,
    pub lock_reason: Option<String>,
    pub can_unlock_with_code: bool,
}

struct LectureFacts {
    has_quiz: bool,
    has_homework: bool,
    progress: ProgressRecord,
    homework_completed: bool,
}

/// Lists a course's visible lectures with per-lecture access decisions for
/// the calling student. Hidden lectures are omitted entirely.
pub async fn list_course_lectures(
    store: &dyn Store,
    student_id: i64,
    cohort: Cohort,
    course_id: i64,
) -> Result<Vec<LectureAccessView>, AppError> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lectures = store.list_lectures(course.id).await?;

    let mut views = Vec::new();
    let mut prior: Option<LectureFacts> = None;

    for (index, lecture) in lectures.into_iter().filter(|l| !l.is_hidden).enumerate() {
        let key = crate::keys::ProgressKey::new(course.year, course.id, lecture.id);

        let counts = store.quiz_variant_counts(lecture.id).await?;
        let has_quiz = counts.values().any(|n| *n > 0);
        let has_homework = !store.homework_questions(lecture.id).await?.is_empty();

        let progress = store.get_progress(student_id, key).await?;
        let homework_completed = store
            .get_homework_record(student_id, key)
            .await?
            .map(|r| r.homework_completed)
            .unwrap_or(false);

        let decision: AccessDecision = resolve_access(
            cohort,
            index,
            prior.as_ref().map(|p| PriorLectureState {
                has_quiz: p.has_quiz,
                has_homework: p.has_homework,
                progress: &p.progress,
                homework_completed: p.homework_completed,
            }),
            &progress,
        );

        views.push(LectureAccessView {
            id: lecture.id,
            ord: lecture.ord,
            title: lecture.title,
            video_url: lecture.video_url,
            has_quiz,
            has_homework,
            quiz_completed: progress.quiz_completed,
            homework_completed,
            earned_marks: progress.earned_marks,
            total_marks: progress.total_marks,
            attempts: progress.attempts,
            locked: decision.locked,
            lock_reason: decision.lock_reason.map(|r| r.message().to_string()),
            can_unlock_with_code: decision.can_unlock_with_code,
        });

        prior = Some(LectureFacts {
            has_quiz,
            has_homework,
            progress,
            homework_completed,
        });
    }

    Ok(views)
}

/// Redeems an access code against a lecture. The store consumes the code and
/// unlocks the lecture in one transaction.
pub async fn redeem_code(
    store: &dyn Store,
    student_id: i64,
    lecture_id: i64,
    code: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let (_lecture, key) = locate_lecture(store, lecture_id).await?;
    store.redeem_code(code, student_id, key, now).await
}
