// src/domain/homework.rs

use std::collections::BTreeMap;

use crate::models::{
    homework::HomeworkDraft,
    progress::McqAnswer,
    question::HomeworkQuestion,
};

/// Unanswered items per category, reported back when submission is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnansweredCounts {
    pub mcq: usize,
    pub essay: usize,
}

impl UnansweredCounts {
    pub fn all_answered(&self) -> bool {
        self.mcq == 0 && self.essay == 0
    }
}

/// Submission gate: every MCQ needs a selection and every essay question
/// needs non-empty text.
pub fn unanswered_counts(
    mcq_total: usize,
    mcq_answers: &[Option<i32>],
    essay_ids: &[i64],
    essay_answers: &BTreeMap<i64, String>,
) -> UnansweredCounts {
    let mcq = (0..mcq_total)
        .filter(|i| mcq_answers.get(*i).copied().flatten().is_none())
        .count();

    let essay = essay_ids
        .iter()
        .filter(|id| {
            essay_answers
                .get(id)
                .map(|text| text.trim().is_empty())
                .unwrap_or(true)
        })
        .count();

    UnansweredCounts { mcq, essay }
}

/// Schema-drift safety: a stale draft whose MCQ array no longer matches the
/// question count is ignored wholesale, never partially applied.
pub fn draft_matches(draft: &HomeworkDraft, mcq_total: usize) -> bool {
    draft.mcq_answers.len() == mcq_total
}

/// Grades positional MCQ answers against the lecture's MCQ list.
pub fn grade_mcqs(questions: &[HomeworkQuestion], answers: &[Option<i32>]) -> Vec<McqAnswer> {
    questions
        .iter()
        .enumerate()
        .filter_map(|(i, q)| {
            let correct_index = q.correct_index?;
            let selected = answers.get(i).copied().flatten();
            Some(McqAnswer {
                question_id: q.id,
                selected,
                correct_index,
                is_correct: selected == Some(correct_index),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_unanswered_counts_per_category() {
        let essay_answers: BTreeMap<i64, String> =
            [(10, "Sedimentary layers".to_string()), (11, "  ".to_string())]
                .into_iter()
                .collect();

        let counts = unanswered_counts(
            3,
            &[Some(1), None, Some(0)],
            &[10, 11, 12],
            &essay_answers,
        );
        assert_eq!(counts.mcq, 1);
        assert_eq!(counts.essay, 2);
        assert!(!counts.all_answered());
    }

    #[test]
    fn test_short_answer_array_counts_missing_tail() {
        let counts = unanswered_counts(4, &[Some(0)], &[], &BTreeMap::new());
        assert_eq!(counts.mcq, 3);
    }

    #[test]
    fn test_draft_length_mismatch_ignored() {
        let draft = HomeworkDraft {
            mcq_answers: vec![Some(0), Some(1)],
            essay_answers: BTreeMap::new(),
            last_saved: Utc::now(),
        };
        assert!(draft_matches(&draft, 2));
        assert!(!draft_matches(&draft, 3));
    }
}
