// src/services/homework.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    domain::homework::{draft_matches, grade_mcqs, unanswered_counts},
    error::AppError,
    models::{
        homework::{
            HomeworkAnswers, HomeworkDraft, HomeworkRecord, SaveDraftRequest,
            SubmitHomeworkRequest,
        },
        question::{HomeworkQuestion, KIND_ESSAY, KIND_MCQ, PublicQuestion},
    },
    services::locate_lecture,
    store::Store,
};

#[derive(Debug, Serialize)]
pub struct HomeworkView {
    pub questions: Vec<PublicQuestion>,
    /// Restored only when it still lines up with the current question set.
    pub draft: Option<HomeworkDraft>,
}

#[derive(Debug, Serialize)]
pub struct HomeworkOutcome {
    pub score: i64,
    pub total: i64,
}

fn split_questions(
    questions: &[HomeworkQuestion],
) -> (Vec<HomeworkQuestion>, Vec<i64>) {
    let mcqs: Vec<HomeworkQuestion> = questions
        .iter()
        .filter(|q| q.kind == KIND_MCQ)
        .cloned()
        .collect();
    let essay_ids: Vec<i64> = questions
        .iter()
        .filter(|q| q.kind == KIND_ESSAY)
        .map(|q| q.id)
        .collect();
    (mcqs, essay_ids)
}

/// Opens the homework form: blocked outright once a completed record exists,
/// otherwise returns the questions plus any still-matching draft.
pub async fn start_homework(
    store: &dyn Store,
    student_id: i64,
    lecture_id: i64,
) -> Result<HomeworkView, AppError> {
    let (lecture, key) = locate_lecture(store, lecture_id).await?;

    if let Some(record) = store.get_homework_record(student_id, key).await? {
        if record.homework_completed {
            return Err(AppError::Conflict(
                "Homework already submitted for this lecture".to_string(),
            ));
        }
    }

    let questions = store.homework_questions(lecture.id).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "This lecture has no homework".to_string(),
        ));
    }

    let mcq_total = questions.iter().filter(|q| q.kind == KIND_MCQ).count();
    let draft = store
        .get_draft(student_id, key)
        .await?
        .filter(|d| draft_matches(d, mcq_total));

    Ok(HomeworkView {
        questions: questions.into_iter().map(Into::into).collect(),
        draft,
    })
}

/// Autosave upsert. Returns false (and writes nothing) when every answer is
/// still empty, so empty drafts never hit the store.
pub async fn save_draft(
    store: &dyn Store,
    student_id: i64,
    lecture_id: i64,
    req: SaveDraftRequest,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let (_lecture, key) = locate_lecture(store, lecture_id).await?;

    if let Some(record) = store.get_homework_record(student_id, key).await? {
        if record.homework_completed {
            return Err(AppError::Conflict(
                "Homework already submitted for this lecture".to_string(),
            ));
        }
    }

    let has_mcq = req.mcq_answers.iter().any(|a| a.is_some());
    let has_essay = req.essay_answers.values().any(|t| !t.trim().is_empty());
    if !has_mcq && !has_essay {
        return Ok(false);
    }

    store
        .save_draft(
            student_id,
            key,
            &HomeworkDraft {
                mcq_answers: req.mcq_answers,
                essay_answers: req.essay_answers,
                last_saved: now,
            },
        )
        .await?;

    Ok(true)
}

/// One-shot submission: the completed-record guard runs again before any
/// write, then MCQs are scored, essays bundled verbatim, and the draft
/// removed best-effort.
pub async fn submit_homework(
    store: &dyn Store,
    student_id: i64,
    lecture_id: i64,
    req: SubmitHomeworkRequest,
    now: DateTime<Utc>,
) -> Result<HomeworkOutcome, AppError> {
    let (lecture, key) = locate_lecture(store, lecture_id).await?;

    if store.get_homework_record(student_id, key).await?.is_some() {
        return Err(AppError::Conflict(
            "Homework already submitted for this lecture".to_string(),
        ));
    }

    let questions = store.homework_questions(lecture.id).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound(
            "This lecture has no homework".to_string(),
        ));
    }

    let (mcqs, essay_ids) = split_questions(&questions);

    let counts = unanswered_counts(
        mcqs.len(),
        &req.mcq_answers,
        &essay_ids,
        &req.essay_answers,
    );
    if !counts.all_answered() {
        return Err(AppError::Validation(format!(
            "{} multiple-choice and {} essay question(s) are still unanswered",
            counts.mcq, counts.essay
        )));
    }

    let graded = grade_mcqs(&mcqs, &req.mcq_answers);
    let score = graded.iter().filter(|a| a.is_correct).count() as i64;
    let total = mcqs.len() as i64;

    store
        .insert_homework_record(
            student_id,
            key,
            &HomeworkRecord {
                score,
                total,
                answers: HomeworkAnswers {
                    mcq: graded,
                    essay: req.essay_answers,
                },
                homework_completed: true,
                submitted_at: now,
            },
        )
        .await?;

    // Best effort: a leftover draft does not block the results page.
    if let Err(e) = store.delete_draft(student_id, key).await {
        tracing::warn!(
            student_id,
            lecture_id,
            "Failed to delete homework draft after submission: {:?}",
            e
        );
    }

    Ok(HomeworkOutcome { score, total })
}
