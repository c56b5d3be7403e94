// src/domain/access.rs

use serde::Serialize;

use crate::models::{progress::ProgressRecord, student::Cohort};

/// Why a lecture is locked. Reported for the FIRST unmet condition in
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    AccessDisabled,
    PreviousLectureLocked,
    PreviousQuizIncomplete,
    PreviousHomeworkIncomplete,
    CodeRequired,
}

impl LockReason {
    pub fn message(&self) -> &'static str {
        match self {
            LockReason::AccessDisabled => "Access to this lecture has been disabled",
            LockReason::PreviousLectureLocked => "The previous lecture is still locked",
            LockReason::PreviousQuizIncomplete => "Complete the previous lecture's quiz first",
            LockReason::PreviousHomeworkIncomplete => {
                "Complete the previous lecture's homework first"
            }
            LockReason::CodeRequired => "An access code is required for this lecture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub locked: bool,
    pub lock_reason: Option<LockReason>,
    /// Only surfaced once every prerequisite except the code itself is met,
    /// so the client never shows a code box the student cannot use yet.
    pub can_unlock_with_code: bool,
}

impl AccessDecision {
    fn open() -> Self {
        Self {
            locked: false,
            lock_reason: None,
            can_unlock_with_code: false,
        }
    }

    fn locked(reason: LockReason) -> Self {
        Self {
            locked: true,
            lock_reason: Some(reason),
            can_unlock_with_code: false,
        }
    }

    fn code_entry(reason: LockReason) -> Self {
        Self {
            locked: true,
            lock_reason: Some(reason),
            can_unlock_with_code: true,
        }
    }
}

/// Pre-fetched state of the previous lecture in the course ordering.
#[derive(Debug, Clone, Copy)]
pub struct PriorLectureState<'a> {
    pub has_quiz: bool,
    pub has_homework: bool,
    pub progress: &'a ProgressRecord,
    pub homework_completed: bool,
}

impl PriorLectureState<'_> {
    fn quiz_done(&self) -> bool {
        !self.has_quiz || self.progress.quiz_completed
    }

    fn homework_done(&self) -> bool {
        !self.has_homework || self.homework_completed
    }
}

/// Computes whether the lecture at `index` is accessible, given pre-fetched
/// progress state. Pure; all I/O happens in the caller.
///
/// Rules, in priority order:
/// 1. An admin disable beats everything.
/// 2. Index 0: `school` cohort is always in; other cohorts need a redeemed
///    code (`progress.unlocked`).
/// 3. Index > 0, `school`: previous quiz and homework (where they exist)
///    must be complete. No code mechanism for this cohort.
/// 4. Index > 0, other cohorts: previous lecture unlocked, previous quiz
///    complete, previous homework complete, then a code for THIS lecture.
pub fn resolve_access(
    cohort: Cohort,
    index: usize,
    prior: Option<PriorLectureState<'_>>,
    progress: &ProgressRecord,
) -> AccessDecision {
    if !progress.is_enabled {
        return AccessDecision::locked(LockReason::AccessDisabled);
    }

    if index == 0 {
        return match cohort {
            Cohort::School => AccessDecision::open(),
            _ if progress.unlocked => AccessDecision::open(),
            _ => AccessDecision::code_entry(LockReason::CodeRequired),
        };
    }

    // Index > 0 always has a predecessor; a missing one means the caller fed
    // us an inconsistent lecture list, so fail closed.
    let Some(prior) = prior else {
        return AccessDecision::locked(LockReason::PreviousLectureLocked);
    };

    if cohort == Cohort::School {
        if !prior.quiz_done() {
            return AccessDecision::locked(LockReason::PreviousQuizIncomplete);
        }
        if !prior.homework_done() {
            return AccessDecision::locked(LockReason::PreviousHomeworkIncomplete);
        }
        return AccessDecision::open();
    }

    if !prior.progress.unlocked {
        return AccessDecision::locked(LockReason::PreviousLectureLocked);
    }
    if !prior.quiz_done() {
        return AccessDecision::locked(LockReason::PreviousQuizIncomplete);
    }
    if !prior.homework_done() {
        return AccessDecision::locked(LockReason::PreviousHomeworkIncomplete);
    }
    if !progress.unlocked {
        return AccessDecision::code_entry(LockReason::CodeRequired);
    }

    AccessDecision::open()
}
