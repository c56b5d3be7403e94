// src/services/quiz.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::{
    config::{DEFAULT_QUIZ_DURATION_MINUTES, MAX_QUIZ_ATTEMPTS},
    domain::quiz::{
        self, AttemptPhase, ESSAY_SET, correct_count, grade_mcqs, pick_variant, required_score,
    },
    error::AppError,
    models::{
        progress::{AnswerSnapshot, AttemptTimer},
        question::PublicQuestion,
    },
    services::locate_lecture,
    store::Store,
};

/// What the client gets back when an attempt starts or resumes.
#[derive(Debug, Serialize)]
pub struct QuizSessionView {
    pub phase: AttemptPhase,
    pub variant: String,
    /// Attempt number this session counts as (1-based).
    pub attempt: i64,
    pub remaining_secs: i64,
    pub resumed: bool,
    pub questions: Vec<PublicQuestion>,
    pub essay_questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct QuizOutcome {
    pub phase: AttemptPhase,
    pub score: i64,
    pub total: i64,
    pub required: i64,
}

impl QuizOutcome {
    pub fn passed(&self) -> bool {
        self.phase == AttemptPhase::Passed
    }
}

/// Starts or resumes a quiz attempt.
///
/// A live timer resumes with its remaining time and the variant already
/// served. A lapsed timer is discarded and a FRESH full-duration attempt
/// starts in its place; expiry does not consume an attempt. Fresh attempts
/// are capped at `MAX_QUIZ_ATTEMPTS`.
pub async fn start_attempt<R: Rng>(
    store: &dyn Store,
    rng: &mut R,
    student_id: i64,
    lecture_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizSessionView, AppError> {
    let (lecture, key) = locate_lecture(store, lecture_id).await?;

    let progress = store.get_progress(student_id, key).await?;
    if !progress.is_enabled {
        return Err(AppError::Forbidden(
            "Access to this lecture has been disabled".to_string(),
        ));
    }
    if progress.quiz_completed {
        return Err(AppError::Conflict(
            "Quiz already completed for this lecture".to_string(),
        ));
    }

    let duration_secs = store
        .get_quiz_duration(lecture.id)
        .await?
        .unwrap_or(DEFAULT_QUIZ_DURATION_MINUTES)
        * 60;

    if let Some(timer) = store.get_timer(student_id, lecture.id).await? {
        let remaining = quiz::remaining_seconds(&timer, now);
        if remaining > 0 {
            let variant = progress.last_variant_used.clone().ok_or_else(|| {
                AppError::InternalServerError(
                    "Attempt timer exists without a served variant".to_string(),
                )
            })?;

            let questions = store.quiz_questions(lecture.id, &variant).await?;
            let essay_questions = store.quiz_questions(lecture.id, ESSAY_SET).await?;

            return Ok(QuizSessionView {
                phase: AttemptPhase::InProgress,
                variant,
                attempt: progress.attempts,
                remaining_secs: remaining,
                resumed: true,
                questions: questions.into_iter().map(Into::into).collect(),
                essay_questions: essay_questions.into_iter().map(Into::into).collect(),
            });
        }

        // Lapsed timer: discard and grant a fresh attempt.
        store.delete_timer(student_id, lecture.id).await?;
        tracing::info!(
            student_id,
            lecture_id = lecture.id,
            "Discarded stale attempt timer"
        );
    }

    if progress.attempts >= MAX_QUIZ_ATTEMPTS {
        return Err(AppError::Forbidden(
            "Attempt limit reached for this quiz. Please contact support.".to_string(),
        ));
    }

    let counts = store.quiz_variant_counts(lecture.id).await?;
    let variant = pick_variant(&counts, &progress.used_variants, rng)
        .ok_or_else(|| AppError::NotFound("This lecture has no quiz".to_string()))?;

    let questions = store.quiz_questions(lecture.id, variant).await?;
    let essay_questions = store.quiz_questions(lecture.id, ESSAY_SET).await?;

    store
        .put_timer(
            student_id,
            lecture.id,
            AttemptTimer {
                started_at: now,
                duration_secs,
            },
        )
        .await?;
    store.increment_attempt(student_id, key, variant).await?;

    Ok(QuizSessionView {
        phase: AttemptPhase::InProgress,
        variant: variant.to_string(),
        attempt: progress.attempts + 1,
        remaining_secs: duration_secs,
        resumed: false,
        questions: questions.into_iter().map(Into::into).collect(),
        essay_questions: essay_questions.into_iter().map(Into::into).collect(),
    })
}

/// Scores a submission. The timer-zero auto-submit goes through this exact
/// path; a lapsed timer only changes the reported phase on a fail.
///
/// Deleting the timer record is the single-flight latch: when the timer
/// firing and a manual click race, the second submission finds no timer and
/// is rejected without side effects.
pub async fn submit_attempt(
    store: &dyn Store,
    student_id: i64,
    lecture_id: i64,
    answers: &HashMap<i64, i32>,
    essay_answers: &BTreeMap<i64, String>,
    now: DateTime<Utc>,
) -> Result<QuizOutcome, AppError> {
    let (lecture, key) = locate_lecture(store, lecture_id).await?;

    let progress = store.get_progress(student_id, key).await?;
    if !progress.is_enabled {
        return Err(AppError::Forbidden(
            "Access to this lecture has been disabled".to_string(),
        ));
    }
    if progress.quiz_completed {
        return Err(AppError::Conflict(
            "Quiz already completed for this lecture".to_string(),
        ));
    }

    let timer = store.get_timer(student_id, lecture.id).await?;
    if !store.delete_timer(student_id, lecture.id).await? {
        return Err(AppError::Conflict(
            "No quiz attempt in progress".to_string(),
        ));
    }
    let expired = timer
        .map(|t| quiz::remaining_seconds(&t, now) == 0)
        .unwrap_or(false);

    let variant = progress
        .last_variant_used
        .clone()
        .ok_or_else(|| AppError::BadRequest("No quiz attempt in progress".to_string()))?;

    let questions = store.quiz_questions(lecture.id, &variant).await?;
    let graded = grade_mcqs(&questions, answers);
    if graded.is_empty() {
        return Err(AppError::NotFound("This lecture has no quiz".to_string()));
    }

    let total = graded.len();
    let score = correct_count(&graded);
    let required = required_score(total);

    if score >= required {
        let snapshot = AnswerSnapshot {
            mcq: graded,
            essay: essay_answers.clone(),
        };
        store
            .complete_and_unlock(student_id, key, score as i64, total as i64, &snapshot)
            .await?;

        return Ok(QuizOutcome {
            phase: AttemptPhase::Passed,
            score: score as i64,
            total: total as i64,
            required: required as i64,
        });
    }

    // Timer already deleted above, so a retake can start (until the cap).
    Ok(QuizOutcome {
        phase: if expired {
            AttemptPhase::Expired
        } else {
            AttemptPhase::Failed
        },
        score: score as i64,
        total: total as i64,
        required: required as i64,
    })
}
