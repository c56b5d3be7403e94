// src/domain/quiz.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::models::{
    progress::{AttemptTimer, McqAnswer},
    question::QuizQuestion,
};

/// The three independent MCQ variant sets per lecture.
pub const QUIZ_VARIANTS: [&str; 3] = ["variant1", "variant2", "variant3"];

/// Name of the shared essay set (one per lecture, across all variants).
pub const ESSAY_SET: &str = "essay";

/// Quiz attempt lifecycle as surfaced to the client.
///
/// `Expired` is a presentation variant of a failed auto-submit: the
/// timer-zero path runs the same scoring as a manual submit, and a passing
/// score still reports `Passed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    InProgress,
    Passed,
    Failed,
    Expired,
}

/// Majority threshold: strictly more than half the questions, via
/// floor(n/2) + 1. n=5 needs 3, n=4 needs 3, n=1 needs 1.
pub fn required_score(total_mcq: usize) -> usize {
    total_mcq / 2 + 1
}

/// Seconds left on an in-flight attempt, clamped so a lapsed timer reads 0
/// rather than negative.
pub fn remaining_seconds(timer: &AttemptTimer, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - timer.started_at).num_seconds();
    (timer.duration_secs - elapsed).max(0)
}

/// Grades MCQ answers keyed by question id against the served question set.
/// Unanswered questions count as wrong. Essay rows are skipped here; they
/// are bundled verbatim into the snapshot by the caller.
pub fn grade_mcqs(questions: &[QuizQuestion], answers: &HashMap<i64, i32>) -> Vec<McqAnswer> {
    questions
        .iter()
        .filter_map(|q| {
            let correct_index = q.correct_index?;
            let selected = answers.get(&q.id).copied();
            Some(McqAnswer {
                question_id: q.id,
                selected,
                correct_index,
                is_correct: selected == Some(correct_index),
            })
        })
        .collect()
}

pub fn correct_count(graded: &[McqAnswer]) -> usize {
    graded.iter().filter(|a| a.is_correct).count()
}

/// Picks the variant for a fresh attempt.
///
/// Prefers a uniform choice among non-empty variants the student has not
/// seen yet; once all have been served, falls back to a uniform choice among
/// all non-empty variants. Returns None when no variant has questions.
pub fn pick_variant<R: Rng>(
    counts: &HashMap<String, i64>,
    used: &[String],
    rng: &mut R,
) -> Option<&'static str> {
    let available: Vec<&'static str> = QUIZ_VARIANTS
        .iter()
        .copied()
        .filter(|v| counts.get(*v).copied().unwrap_or(0) > 0)
        .collect();

    if available.is_empty() {
        return None;
    }

    let unused: Vec<&'static str> = available
        .iter()
        .copied()
        .filter(|v| !used.iter().any(|u| u == v))
        .collect();

    let pool = if unused.is_empty() { &available } else { &unused };
    Some(pool[rng.random_range(0..pool.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_required_score_majority_threshold() {
        assert_eq!(required_score(1), 1);
        assert_eq!(required_score(4), 3);
        assert_eq!(required_score(5), 3);
        assert_eq!(required_score(10), 6);
    }

    #[test]
    fn test_remaining_seconds_decreases_never_negative() {
        let now = Utc::now();
        let timer = AttemptTimer {
            started_at: now,
            duration_secs: 600,
        };

        assert_eq!(remaining_seconds(&timer, now), 600);
        let later = remaining_seconds(&timer, now + Duration::seconds(100));
        let even_later = remaining_seconds(&timer, now + Duration::seconds(200));
        assert_eq!(later, 500);
        assert!(even_later < later);
        assert_eq!(remaining_seconds(&timer, now + Duration::seconds(9999)), 0);
    }

    fn counts(v1: i64, v2: i64, v3: i64) -> HashMap<String, i64> {
        let mut m = HashMap::new();
        m.insert("variant1".to_string(), v1);
        m.insert("variant2".to_string(), v2);
        m.insert("variant3".to_string(), v3);
        m
    }

    #[test]
    fn test_pick_variant_prefers_unused() {
        let mut rng = StdRng::seed_from_u64(7);
        let used = vec!["variant1".to_string(), "variant3".to_string()];
        for _ in 0..20 {
            let picked = pick_variant(&counts(5, 5, 5), &used, &mut rng).unwrap();
            assert_eq!(picked, "variant2");
        }
    }

    #[test]
    fn test_pick_variant_falls_back_once_all_used() {
        let mut rng = StdRng::seed_from_u64(7);
        let used: Vec<String> = QUIZ_VARIANTS.iter().map(|v| v.to_string()).collect();
        let picked = pick_variant(&counts(5, 5, 5), &used, &mut rng);
        assert!(picked.is_some());
    }

    #[test]
    fn test_pick_variant_skips_empty_sets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = pick_variant(&counts(0, 4, 0), &[], &mut rng).unwrap();
            assert_eq!(picked, "variant2");
        }
        assert!(pick_variant(&counts(0, 0, 0), &[], &mut rng).is_none());
    }
}
