// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::{Config, MAX_DEVICES},
    error::AppError,
    models::student::{LoginRequest, NewStudent, RegisterRequest},
    store::Store,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new student.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the student object (excluding password).
pub async fn register(
    State(store): State<Arc<dyn Store>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let student = store
        .insert_student(NewStudent {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password_hash: hashed_password,
            role: "student".to_string(),
            cohort: payload.cohort,
            enrolled_year: payload.enrolled_year,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// Authenticates a student and returns a JWT token.
///
/// Verifies the email and password, then enforces the device limit: a new
/// fingerprint is recorded until `MAX_DEVICES` is reached, after which
/// unknown devices are turned away.
pub async fn login(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student = store
        .find_student_by_email(&payload.email)
        .await?
        .ok_or(AppError::AuthError("Account not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &student.password)?;
    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    if let Some(device_id) = payload.device_id {
        let mut devices = student.devices.0.clone();
        if !devices.contains(&device_id) {
            if devices.len() >= MAX_DEVICES {
                return Err(AppError::AuthError(
                    "Device limit reached for this account".to_string(),
                ));
            }
            devices.push(device_id);
            store.update_devices(student.id, &devices).await?;
        }
    }

    let token = sign_jwt(
        student.id,
        &student.role,
        student.cohort,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "name": student.name,
        "cohort": student.cohort,
        "enrolled_year": student.enrolled_year
    })))
}
