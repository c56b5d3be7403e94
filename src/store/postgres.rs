// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use crate::{
    error::AppError,
    keys::ProgressKey,
    models::{
        course::{Course, CreateLectureRequest, Lecture},
        homework::{HomeworkAnswers, HomeworkDraft, HomeworkRecord},
        progress::{AnswerSnapshot, AttemptTimer, ProgressRecord},
        question::{CreateQuestionRequest, HomeworkQuestion, QuizQuestion},
        student::{NewStudent, Student},
    },
    store::{
        CatalogStore, CodeStore, HomeworkStore, ProgressStore, StudentStore, TimerStore,
        validate_marks,
    },
};

/// Postgres-backed store.
///
/// Queries use the runtime API (`query_as` + `bind`) rather than the
/// compile-time macros so the crate builds without a reachable database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unique constraint") || msg.contains("23505")
}

#[derive(FromRow)]
struct ProgressRow {
    year: i32,
    course_id: i64,
    lecture_id: i64,
    unlocked: bool,
    quiz_completed: bool,
    earned_marks: i64,
    total_marks: i64,
    attempts: i64,
    used_variants: Json<Vec<String>>,
    last_variant_used: Option<String>,
    answers: Option<Json<AnswerSnapshot>>,
    is_enabled: bool,
}

impl ProgressRow {
    fn split(self) -> (ProgressKey, ProgressRecord) {
        let key = ProgressKey::new(self.year, self.course_id, self.lecture_id);
        let record = ProgressRecord {
            unlocked: self.unlocked,
            quiz_completed: self.quiz_completed,
            earned_marks: self.earned_marks,
            total_marks: self.total_marks,
            attempts: self.attempts,
            used_variants: self.used_variants.0,
            last_variant_used: self.last_variant_used,
            answers: self.answers.map(|a| a.0),
            is_enabled: self.is_enabled,
        };
        (key, record)
    }
}

#[derive(FromRow)]
struct DraftRow {
    mcq_answers: Json<Vec<Option<i32>>>,
    essay_answers: Json<std::collections::BTreeMap<i64, String>>,
    last_saved: DateTime<Utc>,
}

#[derive(FromRow)]
struct HomeworkRecordRow {
    score: i64,
    total: i64,
    answers: Json<HomeworkAnswers>,
    homework_completed: bool,
    submitted_at: DateTime<Utc>,
}

#[async_trait]
impl StudentStore for PgStore {
    async fn insert_student(&self, new: NewStudent) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, email, phone, password, role, cohort, enrolled_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, phone, password, role, cohort, enrolled_year, devices, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(&new.role)
        .bind(new.cohort)
        .bind(new.enrolled_year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already registered", new.email))
            } else {
                tracing::error!("Failed to insert student: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, phone, password, role, cohort, enrolled_year, devices, created_at
             FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, phone, password, role, cohort, enrolled_year, devices, created_at
             FROM students WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, phone, password, role, cohort, enrolled_year, devices, created_at
             FROM students ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn update_devices(&self, id: i64, devices: &[String]) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET devices = $1 WHERE id = $2")
            .bind(Json(devices))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn create_course(&self, year: i32, title: &str) -> Result<Course, AppError> {
        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (year, title) VALUES ($1, $2) RETURNING id, year, title",
        )
        .bind(year)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    async fn list_courses(&self, year: Option<i32>) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, year, title FROM courses
             WHERE ($1::INT IS NULL OR year = $1)
             ORDER BY year, id",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        let course =
            sqlx::query_as::<_, Course>("SELECT id, year, title FROM courses WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(course)
    }

    async fn create_lecture(&self, req: &CreateLectureRequest) -> Result<Lecture, AppError> {
        sqlx::query_as::<_, Lecture>(
            r#"
            INSERT INTO lectures (course_id, ord, title, is_hidden, video_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, course_id, ord, title, is_hidden, video_url
            "#,
        )
        .bind(req.course_id)
        .bind(req.ord)
        .bind(&req.title)
        .bind(req.is_hidden)
        .bind(&req.video_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Lecture order {} is already taken in this course",
                    req.ord
                ))
            } else {
                tracing::error!("Failed to create lecture: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn list_lectures(&self, course_id: i64) -> Result<Vec<Lecture>, AppError> {
        let lectures = sqlx::query_as::<_, Lecture>(
            "SELECT id, course_id, ord, title, is_hidden, video_url
             FROM lectures WHERE course_id = $1 ORDER BY ord",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lectures)
    }

    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>, AppError> {
        let lecture = sqlx::query_as::<_, Lecture>(
            "SELECT id, course_id, ord, title, is_hidden, video_url FROM lectures WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lecture)
    }

    async fn insert_quiz_question(
        &self,
        lecture_id: i64,
        variant: &str,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_questions (lecture_id, variant, kind, position, text, image_url, options, correct_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(lecture_id)
        .bind(variant)
        .bind(&req.kind)
        .bind(req.position)
        .bind(&req.text)
        .bind(&req.image_url)
        .bind(Json(&req.options))
        .bind(req.correct_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_homework_question(
        &self,
        lecture_id: i64,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO homework_questions (lecture_id, kind, position, text, image_url, options, correct_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(lecture_id)
        .bind(&req.kind)
        .bind(req.position)
        .bind(&req.text)
        .bind(&req.image_url)
        .bind(Json(&req.options))
        .bind(req.correct_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn quiz_questions(
        &self,
        lecture_id: i64,
        variant: &str,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(
            "SELECT id, lecture_id, variant, kind, position, text, image_url, options, correct_index
             FROM quiz_questions WHERE lecture_id = $1 AND variant = $2 ORDER BY position, id",
        )
        .bind(lecture_id)
        .bind(variant)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn quiz_variant_counts(
        &self,
        lecture_id: i64,
    ) -> Result<HashMap<String, i64>, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT variant, COUNT(*) FROM quiz_questions
             WHERE lecture_id = $1 AND kind = 'mcq' GROUP BY variant",
        )
        .bind(lecture_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn homework_questions(
        &self,
        lecture_id: i64,
    ) -> Result<Vec<HomeworkQuestion>, AppError> {
        let questions = sqlx::query_as::<_, HomeworkQuestion>(
            "SELECT id, lecture_id, kind, position, text, image_url, options, correct_index
             FROM homework_questions WHERE lecture_id = $1 ORDER BY position, id",
        )
        .bind(lecture_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn get_quiz_duration(&self, lecture_id: i64) -> Result<Option<i64>, AppError> {
        let minutes: Option<i64> =
            sqlx::query_scalar("SELECT minutes FROM quiz_durations WHERE lecture_id = $1")
                .bind(lecture_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(minutes)
    }

    async fn set_quiz_duration(&self, lecture_id: i64, minutes: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO quiz_durations (lecture_id, minutes) VALUES ($1, $2)
             ON CONFLICT (lecture_id) DO UPDATE SET minutes = EXCLUDED.minutes",
        )
        .bind(lecture_id)
        .bind(minutes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn get_progress(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<ProgressRecord, AppError> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT year, course_id, lecture_id, unlocked, quiz_completed, earned_marks,
                   total_marks, attempts, used_variants, last_variant_used, answers, is_enabled
            FROM progress
            WHERE student_id = $1 AND year = $2 AND course_id = $3 AND lecture_id = $4
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        // A missing row is the legitimate zero-valued state, not an error.
        Ok(row.map(|r| r.split().1).unwrap_or_default())
    }

    async fn list_progress(
        &self,
        student_id: i64,
    ) -> Result<Vec<(ProgressKey, ProgressRecord)>, AppError> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT year, course_id, lecture_id, unlocked, quiz_completed, earned_marks,
                   total_marks, attempts, used_variants, last_variant_used, answers, is_enabled
            FROM progress
            WHERE student_id = $1
            ORDER BY year, course_id, lecture_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProgressRow::split).collect())
    }

    async fn mark_quiz_complete(
        &self,
        student_id: i64,
        key: ProgressKey,
        earned: i64,
        total: i64,
    ) -> Result<(), AppError> {
        validate_marks(earned, total)?;

        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, quiz_completed, earned_marks, total_marks)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                quiz_completed = TRUE,
                earned_marks = EXCLUDED.earned_marks,
                total_marks = EXCLUDED.total_marks,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(earned)
        .bind(total)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unlock_lecture(&self, student_id: i64, key: ProgressKey) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, unlocked)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                unlocked = TRUE,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_attempt(
        &self,
        student_id: i64,
        key: ProgressKey,
        variant: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, attempts, used_variants, last_variant_used)
            VALUES ($1, $2, $3, $4, 1, jsonb_build_array($5::TEXT), $5)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                attempts = progress.attempts + 1,
                used_variants = progress.used_variants || jsonb_build_array($5::TEXT),
                last_variant_used = $5,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(variant)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn complete_and_unlock(
        &self,
        student_id: i64,
        key: ProgressKey,
        earned: i64,
        total: i64,
        answers: &AnswerSnapshot,
    ) -> Result<(), AppError> {
        validate_marks(earned, total)?;

        // Single statement, so completion, unlock and the answer snapshot
        // land together or not at all.
        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, unlocked, quiz_completed,
                                  earned_marks, total_marks, answers)
            VALUES ($1, $2, $3, $4, TRUE, TRUE, $5, $6, $7)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                unlocked = TRUE,
                quiz_completed = TRUE,
                earned_marks = EXCLUDED.earned_marks,
                total_marks = EXCLUDED.total_marks,
                answers = EXCLUDED.answers,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(earned)
        .bind(total)
        .bind(Json(answers))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_enabled(
        &self,
        student_id: i64,
        key: ProgressKey,
        enabled: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, is_enabled)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                is_enabled = EXCLUDED.is_enabled,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TimerStore for PgStore {
    async fn get_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
    ) -> Result<Option<AttemptTimer>, AppError> {
        let row = sqlx::query_as::<_, (DateTime<Utc>, i64)>(
            "SELECT started_at, duration_secs FROM attempt_timers
             WHERE student_id = $1 AND lecture_id = $2",
        )
        .bind(student_id)
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(started_at, duration_secs)| AttemptTimer {
            started_at,
            duration_secs,
        }))
    }

    async fn put_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
        timer: AttemptTimer,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO attempt_timers (student_id, lecture_id, started_at, duration_secs)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, lecture_id) DO UPDATE SET
                started_at = EXCLUDED.started_at,
                duration_secs = EXCLUDED.duration_secs
            "#,
        )
        .bind(student_id)
        .bind(lecture_id)
        .bind(timer.started_at)
        .bind(timer.duration_secs)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_timer(&self, student_id: i64, lecture_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM attempt_timers WHERE student_id = $1 AND lecture_id = $2")
                .bind(student_id)
                .bind(lecture_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HomeworkStore for PgStore {
    async fn get_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkDraft>, AppError> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            SELECT mcq_answers, essay_answers, last_saved FROM homework_drafts
            WHERE student_id = $1 AND year = $2 AND course_id = $3 AND lecture_id = $4
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| HomeworkDraft {
            mcq_answers: r.mcq_answers.0,
            essay_answers: r.essay_answers.0,
            last_saved: r.last_saved,
        }))
    }

    async fn save_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
        draft: &HomeworkDraft,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO homework_drafts (student_id, year, course_id, lecture_id, mcq_answers, essay_answers, last_saved)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                mcq_answers = EXCLUDED.mcq_answers,
                essay_answers = EXCLUDED.essay_answers,
                last_saved = EXCLUDED.last_saved
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(Json(&draft.mcq_answers))
        .bind(Json(&draft.essay_answers))
        .bind(draft.last_saved)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_draft(&self, student_id: i64, key: ProgressKey) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM homework_drafts
             WHERE student_id = $1 AND year = $2 AND course_id = $3 AND lecture_id = $4",
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkRecord>, AppError> {
        let row = sqlx::query_as::<_, HomeworkRecordRow>(
            r#"
            SELECT score, total, answers, homework_completed, submitted_at FROM homework_records
            WHERE student_id = $1 AND year = $2 AND course_id = $3 AND lecture_id = $4
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| HomeworkRecord {
            score: r.score,
            total: r.total,
            answers: r.answers.0,
            homework_completed: r.homework_completed,
            submitted_at: r.submitted_at,
        }))
    }

    async fn insert_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
        record: &HomeworkRecord,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO homework_records (student_id, year, course_id, lecture_id, score, total,
                                          answers, homework_completed, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(record.score)
        .bind(record.total)
        .bind(Json(&record.answers))
        .bind(record.homework_completed)
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Homework has already been submitted".to_string())
            } else {
                tracing::error!("Failed to insert homework record: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(())
    }
}

#[async_trait]
impl CodeStore for PgStore {
    async fn insert_codes(&self, codes: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for code in codes {
            sqlx::query("INSERT INTO access_codes (code) VALUES ($1)")
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn redeem_code(
        &self,
        code: &str,
        student_id: i64,
        key: ProgressKey,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (i64, bool)>(
            "SELECT id, is_used FROM access_codes WHERE code = $1 FOR UPDATE",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id, is_used)) = row else {
            return Err(AppError::NotFound("Invalid code".to_string()));
        };
        if is_used {
            return Err(AppError::Conflict("Code already used".to_string()));
        }

        sqlx::query(
            r#"
            UPDATE access_codes
            SET is_used = TRUE, used_by = $1, used_at = $2, year = $3, course_id = $4, lecture_id = $5
            WHERE id = $6
            "#,
        )
        .bind(student_id)
        .bind(now)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO progress (student_id, year, course_id, lecture_id, unlocked)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (student_id, year, course_id, lecture_id) DO UPDATE SET
                unlocked = TRUE,
                updated_at = NOW()
            "#,
        )
        .bind(student_id)
        .bind(key.year)
        .bind(key.course_id)
        .bind(key.lecture_id)
        .execute(&mut *tx)
        .await?;

        // Code consumption and the unlock commit together; a crash here
        // rolls both back instead of eating the code.
        tx.commit().await?;
        Ok(())
    }
}
