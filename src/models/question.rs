// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::error::AppError;

pub const KIND_MCQ: &str = "mcq";
pub const KIND_ESSAY: &str = "essay";

/// Represents the 'quiz_questions' table in the database.
///
/// MCQ rows belong to one of the three variants; essay rows live in the
/// shared 'essay' set for the lecture.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub lecture_id: i64,

    /// 'variant1' | 'variant2' | 'variant3' | 'essay'.
    pub variant: String,

    /// Question kind: 'mcq' or 'essay'.
    pub kind: String,

    /// Display order within the set.
    pub position: i32,

    pub text: String,
    pub image_url: Option<String>,

    /// 2-4 options for MCQs, empty for essays.
    pub options: Json<Vec<String>>,

    /// Index into `options` for MCQs; NULL for essays.
    pub correct_index: Option<i32>,
}

/// Represents the 'homework_questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HomeworkQuestion {
    pub id: i64,
    pub lecture_id: i64,
    pub kind: String,
    pub position: i32,
    pub text: String,
    pub image_url: Option<String>,
    pub options: Json<Vec<String>>,
    pub correct_index: Option<i32>,
}

/// DTO for sending a question to the client (excludes the correct index).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub kind: String,
    pub text: String,
    pub image_url: Option<String>,
    pub options: Vec<String>,
}

impl From<QuizQuestion> for PublicQuestion {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            kind: q.kind,
            text: q.text,
            image_url: q.image_url,
            options: q.options.0,
        }
    }
}

impl From<HomeworkQuestion> for PublicQuestion {
    fn from(q: HomeworkQuestion) -> Self {
        Self {
            id: q.id,
            kind: q.kind,
            text: q.text,
            image_url: q.image_url,
            options: q.options.0,
        }
    }
}

/// DTO for creating a quiz or homework question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    /// 'mcq' or 'essay'.
    #[validate(length(min = 1, max = 10))]
    pub kind: String,
    /// Target variant for quiz MCQs. Ignored for homework questions; essay
    /// questions always land in the shared essay set.
    pub variant: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_index: Option<i32>,
}

impl CreateQuestionRequest {
    /// Cross-field shape checks that `validator` derive cannot express:
    /// MCQs need 2-4 options and an in-bounds correct index, essays take
    /// neither.
    pub fn check_shape(&self) -> Result<(), AppError> {
        match self.kind.as_str() {
            KIND_MCQ => {
                if self.options.len() < 2 || self.options.len() > 4 {
                    return Err(AppError::Validation(
                        "MCQ questions need between 2 and 4 options".to_string(),
                    ));
                }
                match self.correct_index {
                    Some(idx) if (idx as usize) < self.options.len() && idx >= 0 => Ok(()),
                    Some(_) => Err(AppError::Validation(
                        "Correct answer index is out of bounds".to_string(),
                    )),
                    None => Err(AppError::Validation(
                        "MCQ questions need a correct answer index".to_string(),
                    )),
                }
            }
            KIND_ESSAY => {
                if !self.options.is_empty() || self.correct_index.is_some() {
                    return Err(AppError::Validation(
                        "Essay questions take no options or correct index".to_string(),
                    ));
                }
                Ok(())
            }
            other => Err(AppError::Validation(format!(
                "Unknown question kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(options: usize, correct: Option<i32>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            kind: KIND_MCQ.to_string(),
            variant: Some("variant1".to_string()),
            position: 0,
            text: "Which rock is igneous?".to_string(),
            image_url: None,
            options: (0..options).map(|i| format!("Option {}", i)).collect(),
            correct_index: correct,
        }
    }

    #[test]
    fn test_mcq_option_bounds() {
        assert!(mcq(1, Some(0)).check_shape().is_err());
        assert!(mcq(2, Some(1)).check_shape().is_ok());
        assert!(mcq(4, Some(3)).check_shape().is_ok());
        assert!(mcq(5, Some(0)).check_shape().is_err());
    }

    #[test]
    fn test_mcq_correct_index_in_bounds() {
        assert!(mcq(3, Some(3)).check_shape().is_err());
        assert!(mcq(3, Some(-1)).check_shape().is_err());
        assert!(mcq(3, None).check_shape().is_err());
    }

    #[test]
    fn test_essay_takes_no_options() {
        let req = CreateQuestionRequest {
            kind: KIND_ESSAY.to_string(),
            variant: None,
            position: 0,
            text: "Describe the rock cycle.".to_string(),
            image_url: None,
            options: vec![],
            correct_index: None,
        };
        assert!(req.check_shape().is_ok());

        let mut bad = mcq(2, Some(0));
        bad.kind = KIND_ESSAY.to_string();
        assert!(bad.check_shape().is_err());
    }
}
