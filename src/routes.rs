// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, codes, courses, homework, progress, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, courses, quiz, homework, codes, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let course_routes = Router::new()
        .route("/", get(courses::list_courses))
        // Lecture listings are personalized (locks, scores), so they sit
        // behind auth.
        .merge(
            Router::new()
                .route("/{id}/lectures", get(courses::list_course_lectures))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let lecture_routes = Router::new()
        .route("/{id}/quiz/start", post(quiz::start_attempt))
        .route("/{id}/quiz/submit", post(quiz::submit_attempt))
        .route("/{id}/homework", get(homework::start_homework))
        .route("/{id}/homework/draft", put(homework::save_draft))
        .route("/{id}/homework/submit", post(homework::submit_homework))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let code_routes = Router::new()
        .route("/redeem", post(codes::redeem))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let me_routes = Router::new()
        .route("/progress", get(progress::my_progress))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/courses", post(admin::create_course))
        .route("/lectures", post(admin::create_lecture))
        .route(
            "/lectures/{id}/questions/quiz",
            post(admin::create_quiz_question),
        )
        .route(
            "/lectures/{id}/questions/homework",
            post(admin::create_homework_question),
        )
        .route("/lectures/{id}/duration", put(admin::set_quiz_duration))
        .route("/codes", post(admin::generate_codes))
        .route("/students", get(admin::list_students))
        .route("/progress/enabled", put(admin::set_progress_enabled))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/lectures", lecture_routes)
        .nest("/api/codes", code_routes)
        .nest("/api/me", me_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
