// src/models/homework.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::progress::McqAnswer;

/// In-progress homework answers, autosaved by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkDraft {
    /// Positional answers aligned with the lecture's MCQ list.
    pub mcq_answers: Vec<Option<i32>>,
    /// Essay text keyed by question id.
    pub essay_answers: BTreeMap<i64, String>,
    pub last_saved: DateTime<Utc>,
}

/// Final, immutable homework submission result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkRecord {
    pub score: i64,
    pub total: i64,
    pub answers: HomeworkAnswers,
    pub homework_completed: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkAnswers {
    pub mcq: Vec<McqAnswer>,
    /// Essay answers stored verbatim; grading happens offline.
    pub essay: BTreeMap<i64, String>,
}

/// DTO for the autosave endpoint.
#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    #[serde(default)]
    pub mcq_answers: Vec<Option<i32>>,
    #[serde(default)]
    pub essay_answers: BTreeMap<i64, String>,
}

/// DTO for the final homework submission.
#[derive(Debug, Deserialize)]
pub struct SubmitHomeworkRequest {
    #[serde(default)]
    pub mcq_answers: Vec<Option<i32>>,
    #[serde(default)]
    pub essay_answers: BTreeMap<i64, String>,
}
