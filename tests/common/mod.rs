// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;

use biogeo_backend::{
    keys::ProgressKey,
    models::{
        course::CreateLectureRequest,
        question::{CreateQuestionRequest, KIND_ESSAY, KIND_MCQ, PublicQuestion},
    },
    store::{CatalogStore, MemoryStore},
};

pub const STUDENT_A: i64 = 9001;
pub const STUDENT_B: i64 = 9002;

/// One course with a single visible lecture. Returns (lecture_id, key).
pub async fn seed_course_with_lecture(store: &MemoryStore) -> (i64, ProgressKey) {
    let course_id = seed_course(store, 2, "Geology I").await;
    let lecture_id = seed_lecture(store, course_id, 1, "The Rock Cycle").await;
    (lecture_id, ProgressKey::new(2, course_id, lecture_id))
}

pub async fn seed_course(store: &MemoryStore, year: i32, title: &str) -> i64 {
    store.create_course(year, title).await.unwrap().id
}

pub async fn seed_lecture(store: &MemoryStore, course_id: i64, ord: i32, title: &str) -> i64 {
    store
        .create_lecture(&CreateLectureRequest {
            course_id,
            ord,
            title: title.to_string(),
            is_hidden: false,
            video_url: None,
        })
        .await
        .unwrap()
        .id
}

pub async fn seed_hidden_lecture(store: &MemoryStore, course_id: i64, ord: i32) -> i64 {
    store
        .create_lecture(&CreateLectureRequest {
            course_id,
            ord,
            title: "Draft material".to_string(),
            is_hidden: true,
            video_url: None,
        })
        .await
        .unwrap()
        .id
}

/// An MCQ whose correct answer is always option 0.
pub fn mcq_request(text: &str, position: i32) -> CreateQuestionRequest {
    CreateQuestionRequest {
        kind: KIND_MCQ.to_string(),
        variant: None,
        position,
        text: text.to_string(),
        image_url: None,
        options: vec![
            "Igneous".to_string(),
            "Sedimentary".to_string(),
            "Metamorphic".to_string(),
        ],
        correct_index: Some(0),
    }
}

pub fn essay_request(text: &str, position: i32) -> CreateQuestionRequest {
    CreateQuestionRequest {
        kind: KIND_ESSAY.to_string(),
        variant: None,
        position,
        text: text.to_string(),
        image_url: None,
        options: vec![],
        correct_index: None,
    }
}

/// Seeds `n` MCQs into one quiz variant set. Returns the question ids.
pub async fn seed_quiz_variant(
    store: &MemoryStore,
    lecture_id: i64,
    variant: &str,
    n: usize,
) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 0..n {
        let req = mcq_request(&format!("Which rock forms from magma? ({})", i), i as i32);
        ids.push(
            store
                .insert_quiz_question(lecture_id, variant, &req)
                .await
                .unwrap(),
        );
    }
    ids
}

/// Seeds all three variants with `n` MCQs each.
pub async fn seed_all_quiz_variants(store: &MemoryStore, lecture_id: i64, n: usize) {
    for variant in ["variant1", "variant2", "variant3"] {
        seed_quiz_variant(store, lecture_id, variant, n).await;
    }
}

/// Seeds homework questions. Returns (mcq ids, essay ids).
pub async fn seed_homework(
    store: &MemoryStore,
    lecture_id: i64,
    mcqs: usize,
    essays: usize,
) -> (Vec<i64>, Vec<i64>) {
    let mut mcq_ids = Vec::new();
    for i in 0..mcqs {
        let req = mcq_request(&format!("Which layer is oldest? ({})", i), i as i32);
        mcq_ids.push(
            store
                .insert_homework_question(lecture_id, &req)
                .await
                .unwrap(),
        );
    }
    let mut essay_ids = Vec::new();
    for i in 0..essays {
        let req = essay_request("Describe how sedimentary rock forms.", (mcqs + i) as i32);
        essay_ids.push(
            store
                .insert_homework_question(lecture_id, &req)
                .await
                .unwrap(),
        );
    }
    (mcq_ids, essay_ids)
}

/// Answers every served question with the same option index. Option 0 is
/// always correct for seeded questions, anything else is always wrong.
pub fn answer_all(questions: &[PublicQuestion], selected: i32) -> HashMap<i64, i32> {
    questions.iter().map(|q| (q.id, selected)).collect()
}
