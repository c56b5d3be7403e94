// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    keys::ProgressKey,
    models::{
        access_code::AccessCode,
        course::{Course, CreateLectureRequest, Lecture},
        homework::{HomeworkDraft, HomeworkRecord},
        progress::{AnswerSnapshot, AttemptTimer, ProgressRecord},
        question::{CreateQuestionRequest, HomeworkQuestion, QuizQuestion},
        student::{NewStudent, Student},
    },
    store::{
        CatalogStore, CodeStore, HomeworkStore, ProgressStore, StudentStore, TimerStore,
        validate_marks,
    },
};

/// In-memory store used by the test suites (and handy for local demos).
///
/// Progress-shaped maps are keyed by the legacy string encoding of
/// `ProgressKey`, so the encode/parse boundary gets exercised the same way
/// the document-store era keys were.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    students: HashMap<i64, Student>,
    courses: HashMap<i64, Course>,
    lectures: HashMap<i64, Lecture>,
    quiz_questions: Vec<QuizQuestion>,
    homework_questions: Vec<HomeworkQuestion>,
    durations: HashMap<i64, i64>,
    progress: HashMap<(i64, String), ProgressRecord>,
    timers: HashMap<(i64, i64), AttemptTimer>,
    drafts: HashMap<(i64, String), HomeworkDraft>,
    homework_records: HashMap<(i64, String), HomeworkRecord>,
    codes: HashMap<String, AccessCode>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Poisoning only happens if a test panicked mid-write; the data is
        // still usable for the remaining assertions.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn insert_student(&self, new: NewStudent) -> Result<Student, AppError> {
        let mut inner = self.lock();

        if inner.students.values().any(|s| s.email == new.email) {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                new.email
            )));
        }

        let id = inner.next_id();
        let student = Student {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            password: new.password_hash,
            role: new.role,
            cohort: new.cohort,
            enrolled_year: new.enrolled_year,
            devices: sqlx::types::Json(Vec::new()),
            created_at: Some(Utc::now()),
        };
        inner.students.insert(id, student.clone());
        Ok(student)
    }

    async fn find_student(&self, id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.lock().students.get(&id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        Ok(self
            .lock()
            .students
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        let mut students: Vec<Student> = self.lock().students.values().cloned().collect();
        students.sort_by_key(|s| std::cmp::Reverse(s.id));
        Ok(students)
    }

    async fn update_devices(&self, id: i64, devices: &[String]) -> Result<(), AppError> {
        let mut inner = self.lock();
        let student = inner
            .students
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        student.devices = sqlx::types::Json(devices.to_vec());
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_course(&self, year: i32, title: &str) -> Result<Course, AppError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let course = Course {
            id,
            year,
            title: title.to_string(),
        };
        inner.courses.insert(id, course.clone());
        Ok(course)
    }

    async fn list_courses(&self, year: Option<i32>) -> Result<Vec<Course>, AppError> {
        let mut courses: Vec<Course> = self
            .lock()
            .courses
            .values()
            .filter(|c| year.is_none_or(|y| c.year == y))
            .cloned()
            .collect();
        courses.sort_by_key(|c| (c.year, c.id));
        Ok(courses)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.lock().courses.get(&id).cloned())
    }

    async fn create_lecture(&self, req: &CreateLectureRequest) -> Result<Lecture, AppError> {
        let mut inner = self.lock();

        if inner
            .lectures
            .values()
            .any(|l| l.course_id == req.course_id && l.ord == req.ord)
        {
            return Err(AppError::Conflict(format!(
                "Lecture order {} is already taken in this course",
                req.ord
            )));
        }

        let id = inner.next_id();
        let lecture = Lecture {
            id,
            course_id: req.course_id,
            ord: req.ord,
            title: req.title.clone(),
            is_hidden: req.is_hidden,
            video_url: req.video_url.clone(),
        };
        inner.lectures.insert(id, lecture.clone());
        Ok(lecture)
    }

    async fn list_lectures(&self, course_id: i64) -> Result<Vec<Lecture>, AppError> {
        let mut lectures: Vec<Lecture> = self
            .lock()
            .lectures
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        lectures.sort_by_key(|l| l.ord);
        Ok(lectures)
    }

    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>, AppError> {
        Ok(self.lock().lectures.get(&id).cloned())
    }

    async fn insert_quiz_question(
        &self,
        lecture_id: i64,
        variant: &str,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.quiz_questions.push(QuizQuestion {
            id,
            lecture_id,
            variant: variant.to_string(),
            kind: req.kind.clone(),
            position: req.position,
            text: req.text.clone(),
            image_url: req.image_url.clone(),
            options: sqlx::types::Json(req.options.clone()),
            correct_index: req.correct_index,
        });
        Ok(id)
    }

    async fn insert_homework_question(
        &self,
        lecture_id: i64,
        req: &CreateQuestionRequest,
    ) -> Result<i64, AppError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        inner.homework_questions.push(HomeworkQuestion {
            id,
            lecture_id,
            kind: req.kind.clone(),
            position: req.position,
            text: req.text.clone(),
            image_url: req.image_url.clone(),
            options: sqlx::types::Json(req.options.clone()),
            correct_index: req.correct_index,
        });
        Ok(id)
    }

    async fn quiz_questions(
        &self,
        lecture_id: i64,
        variant: &str,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let mut questions: Vec<QuizQuestion> = self
            .lock()
            .quiz_questions
            .iter()
            .filter(|q| q.lecture_id == lecture_id && q.variant == variant)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.position, q.id));
        Ok(questions)
    }

    async fn quiz_variant_counts(
        &self,
        lecture_id: i64,
    ) -> Result<HashMap<String, i64>, AppError> {
        let inner = self.lock();
        let mut counts = HashMap::new();
        for q in inner
            .quiz_questions
            .iter()
            .filter(|q| q.lecture_id == lecture_id && q.kind == "mcq")
        {
            *counts.entry(q.variant.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn homework_questions(
        &self,
        lecture_id: i64,
    ) -> Result<Vec<HomeworkQuestion>, AppError> {
        let mut questions: Vec<HomeworkQuestion> = self
            .lock()
            .homework_questions
            .iter()
            .filter(|q| q.lecture_id == lecture_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.position, q.id));
        Ok(questions)
    }

    async fn get_quiz_duration(&self, lecture_id: i64) -> Result<Option<i64>, AppError> {
        Ok(self.lock().durations.get(&lecture_id).copied())
    }

    async fn set_quiz_duration(&self, lecture_id: i64, minutes: i64) -> Result<(), AppError> {
        self.lock().durations.insert(lecture_id, minutes);
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_progress(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<ProgressRecord, AppError> {
        Ok(self
            .lock()
            .progress
            .get(&(student_id, key.encode()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_progress(
        &self,
        student_id: i64,
    ) -> Result<Vec<(ProgressKey, ProgressRecord)>, AppError> {
        let inner = self.lock();
        let mut rows = Vec::new();
        for ((sid, raw), record) in &inner.progress {
            if *sid == student_id {
                rows.push((ProgressKey::parse(raw)?, record.clone()));
            }
        }
        rows.sort_by_key(|(k, _)| (k.year, k.course_id, k.lecture_id));
        Ok(rows)
    }

    async fn mark_quiz_complete(
        &self,
        student_id: i64,
        key: ProgressKey,
        earned: i64,
        total: i64,
    ) -> Result<(), AppError> {
        validate_marks(earned, total)?;

        let mut inner = self.lock();
        let record = inner
            .progress
            .entry((student_id, key.encode()))
            .or_default();
        record.quiz_completed = true;
        record.earned_marks = earned;
        record.total_marks = total;
        Ok(())
    }

    async fn unlock_lecture(&self, student_id: i64, key: ProgressKey) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner
            .progress
            .entry((student_id, key.encode()))
            .or_default()
            .unlocked = true;
        Ok(())
    }

    async fn increment_attempt(
        &self,
        student_id: i64,
        key: ProgressKey,
        variant: &str,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        let record = inner
            .progress
            .entry((student_id, key.encode()))
            .or_default();
        record.attempts += 1;
        record.used_variants.push(variant.to_string());
        record.last_variant_used = Some(variant.to_string());
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

        let mut inner = self.lock();
        let record = inner
            .progress
            .entry((student_id, key.encode()))
            .or_default();
        record.quiz_completed = true;
        record.unlocked = true;
        record.earned_marks = earned;
        record.total_marks = total;
        record.answers = Some(answers.clone());
        Ok(())
    }

    async fn set_enabled(
        &self,
        student_id: i64,
        key: ProgressKey,
        enabled: bool,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner
            .progress
            .entry((student_id, key.encode()))
            .or_default()
            .is_enabled = enabled;
        Ok(())
    }
}

#[async_trait]
impl TimerStore for MemoryStore {
    async fn get_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
    ) -> Result<Option<AttemptTimer>, AppError> {
        Ok(self.lock().timers.get(&(student_id, lecture_id)).copied())
    }

    async fn put_timer(
        &self,
        student_id: i64,
        lecture_id: i64,
        timer: AttemptTimer,
    ) -> Result<(), AppError> {
        self.lock().timers.insert((student_id, lecture_id), timer);
        Ok(())
    }

    async fn delete_timer(&self, student_id: i64, lecture_id: i64) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .timers
            .remove(&(student_id, lecture_id))
            .is_some())
    }
}

#[async_trait]
impl HomeworkStore for MemoryStore {
    async fn get_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkDraft>, AppError> {
        Ok(self
            .lock()
            .drafts
            .get(&(student_id, key.encode()))
            .cloned())
    }

    async fn save_draft(
        &self,
        student_id: i64,
        key: ProgressKey,
        draft: &HomeworkDraft,
    ) -> Result<(), AppError> {
        self.lock()
            .drafts
            .insert((student_id, key.encode()), draft.clone());
        Ok(())
    }

    async fn delete_draft(&self, student_id: i64, key: ProgressKey) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .drafts
            .remove(&(student_id, key.encode()))
            .is_some())
    }

    async fn get_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
    ) -> Result<Option<HomeworkRecord>, AppError> {
        Ok(self
            .lock()
            .homework_records
            .get(&(student_id, key.encode()))
            .cloned())
    }

    async fn insert_homework_record(
        &self,
        student_id: i64,
        key: ProgressKey,
        record: &HomeworkRecord,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        let slot = (student_id, key.encode());
        if inner.homework_records.contains_key(&slot) {
            return Err(AppError::Conflict(
                "Homework has already been submitted".to_string(),
            ));
        }
        inner.homework_records.insert(slot, record.clone());
        Ok(())
    }
}

#[async_trait]
impl CodeStore for MemoryStore {
    async fn insert_codes(&self, codes: &[String]) -> Result<(), AppError> {
        let mut inner = self.lock();
        for code in codes {
            let id = inner.next_id();
            inner.codes.insert(
                code.clone(),
                AccessCode {
                    id,
                    code: code.clone(),
                    is_used: false,
                    used_by: None,
                    used_at: None,
                    year: None,
                    course_id: None,
                    lecture_id: None,
                },
            );
        }
        Ok(())
    }

    async fn redeem_code(
        &self,
        code: &str,
        student_id: i64,
        key: ProgressKey,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();

        let entry = inner
            .codes
            .get_mut(code)
            .ok_or_else(|| AppError::NotFound("Invalid code".to_string()))?;
        if entry.is_used {
            return Err(AppError::Conflict("Code already used".to_string()));
        }

        entry.is_used = true;
        entry.used_by = Some(student_id);
        entry.used_at = Some(now);
        entry.year = Some(key.year);
        entry.course_id = Some(key.course_id);
        entry.lecture_id = Some(key.lecture_id);

        inner
            .progress
            .entry((student_id, key.encode()))
            .or_default()
            .unlocked = true;
        Ok(())
    }
}
