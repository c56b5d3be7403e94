// tests/api_tests.rs
//
// End-to-end tests over real HTTP: the router is served on an ephemeral
// port with the in-memory store behind it.

use std::collections::HashMap;
use std::sync::Arc;

use biogeo_backend::{
    config::Config,
    create_router,
    models::student::{Cohort, NewStudent},
    state::AppState,
    store::{MemoryStore, Store, StudentStore},
    utils::hash::hash_password,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

async fn spawn_app() -> (String, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration: 3600,
        rust_log: "info".to_string(),
        admin_email: None,
        admin_password: None,
    };
    let state = AppState {
        store: store.clone(),
        config,
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), store)
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

async fn register_and_login(
    client: &reqwest::Client,
    base: &str,
    cohort: &str,
) -> (String, String) {
    let email = unique_email();
    let res = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({
            "name": "Test Student",
            "email": email,
            "password": "secret123",
            "cohort": cohort,
            "enrolled_year": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    (body["token"].as_str().unwrap().to_string(), email)
}

async fn seed_and_login_admin(client: &reqwest::Client, base: &str, store: &dyn Store) -> String {
    let email = unique_email();
    store
        .insert_student(NewStudent {
            name: "Admin".to_string(),
            email: email.clone(),
            phone: None,
            password_hash: hash_password("admin-pass").unwrap(),
            role: "admin".to_string(),
            cohort: Cohort::Center,
            enrolled_year: 1,
        })
        .await
        .unwrap();

    let res = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": "admin-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_rejects_invalid_payload() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({
            "name": "X",
            "email": "not-an-email",
            "password": "123",
            "cohort": "school",
            "enrolled_year": 9
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_never_leaks_password() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({
            "name": "Nadia",
            "email": unique_email(),
            "password": "secret123",
            "cohort": "online",
            "enrolled_year": 3
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["cohort"], "online");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_token, email) = register_and_login(&client, &base, "school").await;

    let res = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_device_limit_enforced_at_login() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_token, email) = register_and_login(&client, &base, "school").await;

    for device in ["laptop", "phone"] {
        let res = client
            .post(format!("{}/api/auth/login", base))
            .json(&json!({ "email": email, "password": "secret123", "device_id": device }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Known devices keep working.
    let res = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": "secret123", "device_id": "laptop" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A third fingerprint is turned away.
    let res = client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": "secret123", "device_id": "tablet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Device limit reached for this account");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/me/progress", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/me/progress", base))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_closed_to_students() {
    let (base, _store) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _email) = register_and_login(&client, &base, "school").await;

    let res = client
        .post(format!("{}/api/admin/courses", base))
        .bearer_auth(token)
        .json(&json!({ "year": 1, "title": "Botany" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

/// Full journey: admin builds the catalog, a center-cohort student redeems a
/// code, takes the quiz over HTTP and passes.
#[tokio::test]
async fn test_full_quiz_journey() {
    let (base, store) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = seed_and_login_admin(&client, &base, store.as_ref()).await;

    let res = client
        .post(format!("{}/api/admin/courses", base))
        .bearer_auth(&admin_token)
        .json(&json!({ "year": 2, "title": "Plate Tectonics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let course: Value = res.json().await.unwrap();
    let course_id = course["id"].as_i64().unwrap();

    let res = client
        .post(format!("{}/api/admin/lectures", base))
        .bearer_auth(&admin_token)
        .json(&json!({ "course_id": course_id, "ord": 1, "title": "Continental Drift" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let lecture: Value = res.json().await.unwrap();
    let lecture_id = lecture["id"].as_i64().unwrap();

    // Only variant1 has questions, so the rotation must serve it.
    for i in 0..3 {
        let res = client
            .post(format!(
                "{}/api/admin/lectures/{}/questions/quiz",
                base, lecture_id
            ))
            .bearer_auth(&admin_token)
            .json(&json!({
                "kind": "mcq",
                "variant": "variant1",
                "position": i,
                "text": format!("Which plate boundary builds mountains? ({})", i),
                "options": ["Convergent", "Divergent", "Transform"],
                "correct_index": 0
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .post(format!("{}/api/admin/codes", base))
        .bearer_auth(&admin_token)
        .json(&json!({ "count": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let codes: Value = res.json().await.unwrap();
    let code = codes["codes"][0].as_str().unwrap().to_string();

    let (student_token, _email) = register_and_login(&client, &base, "center").await;

    // Locked until the code is redeemed.
    let res = client
        .get(format!("{}/api/courses/{}/lectures", base, course_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    let views: Value = res.json().await.unwrap();
    assert_eq!(views[0]["locked"], true);
    assert_eq!(views[0]["can_unlock_with_code"], true);
    assert_eq!(views[0]["has_quiz"], true);

    let res = client
        .post(format!("{}/api/codes/redeem", base))
        .bearer_auth(&student_token)
        .json(&json!({ "code": code, "lecture_id": lecture_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/lectures/{}/quiz/start", base, lecture_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["variant"], "variant1");
    assert_eq!(session["attempt"], 1);

    // Question payloads never expose the correct index.
    let questions = session["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q.get("correct_index").is_none()));

    let answers: HashMap<String, i32> = questions
        .iter()
        .map(|q| (q["id"].as_i64().unwrap().to_string(), 0))
        .collect();
    let res = client
        .post(format!("{}/api/lectures/{}/quiz/submit", base, lecture_id))
        .bearer_auth(&student_token)
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["phase"], "passed");
    assert_eq!(outcome["score"], 3);

    // The pass shows up on the course page and the dashboard.
    let res = client
        .get(format!("{}/api/courses/{}/lectures", base, course_id))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    let views: Value = res.json().await.unwrap();
    assert_eq!(views[0]["quiz_completed"], true);
    assert_eq!(views[0]["locked"], false);

    let res = client
        .get(format!("{}/api/me/progress", base))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    let rows: Value = res.json().await.unwrap();
    assert_eq!(rows[0]["key"], format!("2_{}_{}", course_id, lecture_id));
    assert_eq!(rows[0]["quiz_completed"], true);
}
