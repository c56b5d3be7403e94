// src/keys.rs

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Structured composite key for progress, homework drafts and homework
/// records: `(year, course, lecture)` under a student.
///
/// The historical storage format concatenated these as
/// `{year}_{courseId}_{lectureId}` and split on `_`, which corrupts as soon
/// as an id contains an underscore. The struct is the canonical form; the
/// string encoding only exists at the store boundary and in export views,
/// and decoding rejects anything that is not exactly three integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub year: i32,
    pub course_id: i64,
    pub lecture_id: i64,
}

impl ProgressKey {
    pub fn new(year: i32, course_id: i64, lecture_id: i64) -> Self {
        Self {
            year,
            course_id,
            lecture_id,
        }
    }

    /// Legacy `{year}_{courseId}_{lectureId}` encoding.
    pub fn encode(&self) -> String {
        format!("{}_{}_{}", self.year, self.course_id, self.lecture_id)
    }

    /// Parses the legacy encoding. Fails on any malformed input instead of
    /// silently mis-splitting.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = raw.split('_').collect();
        if parts.len() != 3 {
            return Err(AppError::Validation(format!(
                "Malformed progress key '{}'",
                raw
            )));
        }

        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| AppError::Validation(format!("Malformed progress key '{}'", raw)))?;
        let course_id = parts[1]
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("Malformed progress key '{}'", raw)))?;
        let lecture_id = parts[2]
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("Malformed progress key '{}'", raw)))?;

        Ok(Self {
            year,
            course_id,
            lecture_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let key = ProgressKey::new(2026, 12, 345);
        assert_eq!(key.encode(), "2026_12_345");
        assert_eq!(ProgressKey::parse("2026_12_345").unwrap(), key);
    }

    #[test]
    fn test_rejects_wrong_arity() {
        assert!(ProgressKey::parse("2026_12").is_err());
        assert!(ProgressKey::parse("2026_12_345_9").is_err());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(ProgressKey::parse("2026_bio_345").is_err());
        assert!(ProgressKey::parse("").is_err());
    }
}
