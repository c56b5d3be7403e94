// tests/access_tests.rs

mod common;

use std::collections::BTreeMap;

use biogeo_backend::{
    error::AppError,
    keys::ProgressKey,
    models::{
        homework::{HomeworkAnswers, HomeworkRecord},
        progress::{AnswerSnapshot, ProgressRecord},
        student::Cohort,
    },
    services::lectures,
    store::{CodeStore, HomeworkStore, MemoryStore, ProgressStore},
};
use chrono::Utc;

use common::{
    STUDENT_A, STUDENT_B, seed_course, seed_hidden_lecture, seed_homework, seed_lecture,
    seed_quiz_variant,
};

/// Three-lecture course. Lectures 1 and 2 carry a quiz and homework,
/// lecture 3 is video-only.
async fn seed_chain(store: &MemoryStore) -> (i64, Vec<i64>) {
    let course_id = seed_course(store, 3, "Evolutionary Biology").await;
    let mut lecture_ids = Vec::new();
    for ord in 1..=3 {
        let id = seed_lecture(store, course_id, ord, &format!("Lecture {}", ord)).await;
        if ord < 3 {
            seed_quiz_variant(store, id, "variant1", 3).await;
            seed_homework(store, id, 2, 0).await;
        }
        lecture_ids.push(id);
    }
    (course_id, lecture_ids)
}

fn key_for(course_id: i64, lecture_id: i64) -> ProgressKey {
    ProgressKey::new(3, course_id, lecture_id)
}

async fn pass_quiz(store: &MemoryStore, student_id: i64, key: ProgressKey) {
    let snapshot = AnswerSnapshot {
        mcq: vec![],
        essay: BTreeMap::new(),
    };
    store
        .complete_and_unlock(student_id, key, 3, 3, &snapshot)
        .await
        .unwrap();
}

async fn complete_homework(store: &MemoryStore, student_id: i64, key: ProgressKey) {
    let record = HomeworkRecord {
        score: 2,
        total: 2,
        answers: HomeworkAnswers {
            mcq: vec![],
            essay: BTreeMap::new(),
        },
        homework_completed: true,
        submitted_at: Utc::now(),
    };
    store
        .insert_homework_record(student_id, key, &record)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fresh_progress_reads_as_default() {
    let store = MemoryStore::new();
    let key = ProgressKey::new(1, 10, 20);

    let progress = store.get_progress(STUDENT_A, key).await.unwrap();
    assert_eq!(progress, ProgressRecord::default());
    assert!(progress.is_enabled);
    assert_eq!(progress.attempts, 0);
}

#[tokio::test]
async fn test_school_chain_gates_on_quiz_then_homework() {
    let store = MemoryStore::new();
    let (course_id, lectures_ids) = seed_chain(&store).await;

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::School, course_id)
        .await
        .unwrap();
    assert_eq!(views.len(), 3);
    assert!(!views[0].locked);
    assert!(views[1].locked);
    assert_eq!(
        views[1].lock_reason.as_deref(),
        Some("Complete the previous lecture's quiz first")
    );
    assert!(!views[1].can_unlock_with_code);

    // Quiz passed, homework still open: the reason moves on.
    pass_quiz(&store, STUDENT_A, key_for(course_id, lectures_ids[0])).await;
    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::School, course_id)
        .await
        .unwrap();
    assert_eq!(
        views[1].lock_reason.as_deref(),
        Some("Complete the previous lecture's homework first")
    );

    complete_homework(&store, STUDENT_A, key_for(course_id, lectures_ids[0])).await;
    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::School, course_id)
        .await
        .unwrap();
    assert!(!views[1].locked);
    // Lecture 3 still waits on lecture 2's activities.
    assert!(views[2].locked);
}

#[tokio::test]
async fn test_center_needs_code_per_lecture() {
    let store = MemoryStore::new();
    let (course_id, lecture_ids) = seed_chain(&store).await;

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::Center, course_id)
        .await
        .unwrap();
    // First lecture: every prerequisite is met except the code itself.
    assert!(views[0].locked);
    assert!(views[0].can_unlock_with_code);
    // Later lectures hide the code box until the chain is satisfied.
    assert!(views[1].locked);
    assert!(!views[1].can_unlock_with_code);
    assert_eq!(
        views[2].lock_reason.as_deref(),
        Some("The previous lecture is still locked")
    );

    store.insert_codes(&["GEO1CODE99".to_string()]).await.unwrap();
    lectures::redeem_code(&store, STUDENT_A, lecture_ids[0], "GEO1CODE99", Utc::now())
        .await
        .unwrap();

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::Center, course_id)
        .await
        .unwrap();
    assert!(!views[0].locked);

    // Chain done on lecture 1: lecture 2 now offers code entry.
    pass_quiz(&store, STUDENT_A, key_for(course_id, lecture_ids[0])).await;
    complete_homework(&store, STUDENT_A, key_for(course_id, lecture_ids[0])).await;
    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::Center, course_id)
        .await
        .unwrap();
    assert!(views[1].locked);
    assert!(views[1].can_unlock_with_code);
    assert_eq!(
        views[1].lock_reason.as_deref(),
        Some("An access code is required for this lecture")
    );
}

#[tokio::test]
async fn test_code_is_single_use() {
    let store = MemoryStore::new();
    let (course_id, lecture_ids) = seed_chain(&store).await;

    store.insert_codes(&["ONESHOT123".to_string()]).await.unwrap();
    lectures::redeem_code(&store, STUDENT_A, lecture_ids[0], "ONESHOT123", Utc::now())
        .await
        .unwrap();

    // Someone else trying the same code gets a conflict and stays locked.
    let err = lectures::redeem_code(&store, STUDENT_B, lecture_ids[0], "ONESHOT123", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let progress = store
        .get_progress(STUDENT_B, key_for(course_id, lecture_ids[0]))
        .await
        .unwrap();
    assert!(!progress.unlocked);
}

#[tokio::test]
async fn test_unknown_code_rejected() {
    let store = MemoryStore::new();
    let (_course_id, lecture_ids) = seed_chain(&store).await;

    let err = lectures::redeem_code(&store, STUDENT_A, lecture_ids[0], "NOSUCHCODE", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_hidden_lectures_skip_the_chain() {
    let store = MemoryStore::new();
    let course_id = seed_course(&store, 3, "Mineralogy").await;
    let first = seed_lecture(&store, course_id, 1, "Crystals").await;
    seed_hidden_lecture(&store, course_id, 2).await;
    let third = seed_lecture(&store, course_id, 3, "Gemstones").await;

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::School, course_id)
        .await
        .unwrap();

    // Hidden lecture is absent and does not gate its successor: the first
    // lecture has no activities, so the next visible one opens directly.
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].id, first);
    assert_eq!(views[1].id, third);
    assert!(!views[1].locked);
}

#[tokio::test]
async fn test_admin_disable_overrides_unlock() {
    let store = MemoryStore::new();
    let (course_id, lecture_ids) = seed_chain(&store).await;
    let key = key_for(course_id, lecture_ids[0]);

    store.unlock_lecture(STUDENT_A, key).await.unwrap();
    store.set_enabled(STUDENT_A, key, false).await.unwrap();

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::Center, course_id)
        .await
        .unwrap();
    assert!(views[0].locked);
    assert_eq!(
        views[0].lock_reason.as_deref(),
        Some("Access to this lecture has been disabled")
    );
    assert!(!views[0].can_unlock_with_code);
}

#[tokio::test]
async fn test_activity_flags_derived_from_questions() {
    let store = MemoryStore::new();
    let course_id = seed_course(&store, 2, "Paleontology").await;
    let with_quiz = seed_lecture(&store, course_id, 1, "Fossils").await;
    let video_only = seed_lecture(&store, course_id, 2, "Field Trip").await;
    seed_quiz_variant(&store, with_quiz, "variant2", 4).await;
    seed_homework(&store, with_quiz, 0, 1).await;

    let views = lectures::list_course_lectures(&store, STUDENT_A, Cohort::School, course_id)
        .await
        .unwrap();

    assert!(views[0].has_quiz);
    assert!(views[0].has_homework);
    assert_eq!(views[0].id, with_quiz);
    assert_eq!(views[1].id, video_only);
    assert!(!views[1].has_quiz);
    assert!(!views[1].has_homework);
}

#[tokio::test]
async fn test_progress_listing_roundtrips_keys() {
    let store = MemoryStore::new();
    let key_a = ProgressKey::new(2, 7, 11);
    let key_b = ProgressKey::new(3, 8, 12);

    store.unlock_lecture(STUDENT_A, key_a).await.unwrap();
    store.unlock_lecture(STUDENT_A, key_b).await.unwrap();
    store.unlock_lecture(STUDENT_B, key_a).await.unwrap();

    let rows = store.list_progress(STUDENT_A).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, key_a);
    assert_eq!(rows[1].0, key_b);
    assert!(rows.iter().all(|(_, r)| r.unlocked));
}
