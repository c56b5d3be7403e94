// src/models/progress.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-student, per-lecture progress record.
///
/// Created lazily on the first quiz attempt or code redemption; merged,
/// never replaced, and never deleted. A missing row reads as the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub unlocked: bool,
    pub quiz_completed: bool,
    pub earned_marks: i64,
    pub total_marks: i64,
    pub attempts: i64,
    /// Variant names already served to this student.
    pub used_variants: Vec<String>,
    pub last_variant_used: Option<String>,
    /// Snapshot of the submitted answers from the passing attempt.
    pub answers: Option<AnswerSnapshot>,
    /// Admin override to revoke access post-unlock.
    pub is_enabled: bool,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            unlocked: false,
            quiz_completed: false,
            earned_marks: 0,
            total_marks: 0,
            attempts: 0,
            used_variants: Vec::new(),
            last_variant_used: None,
            answers: None,
            is_enabled: true,
        }
    }
}

/// Submitted MCQ/essay responses with correctness flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSnapshot {
    pub mcq: Vec<McqAnswer>,
    /// Essay answers keyed by question id, stored verbatim (ungraded).
    pub essay: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqAnswer {
    pub question_id: i64,
    /// Selected option index; None when the question was left blank.
    pub selected: Option<i32>,
    pub correct_index: i32,
    pub is_correct: bool,
}

/// In-flight quiz attempt timer. Exists only while an attempt is running;
/// deleted on pass, fail or expiry so a fresh attempt can start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttemptTimer {
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
}
