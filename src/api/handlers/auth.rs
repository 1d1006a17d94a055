use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    auth::AuthService,
    domain::CreateUserRequest,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: String,
}

/// Password login. Both unknown-email and wrong-password come back as the
/// same generic 401 so callers can't enumerate accounts; the distinction
/// only shows up in server logs. No session artifact is issued: admin
/// routes re-derive authorization from the bearer email on every call.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state.service_context.user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| {
            tracing::debug!(email = %req.email, "login rejected: unknown email");
            AppError::InvalidCredentials
        })?;

    if !AuthService::verify_password(&req.password, &user.password_hash).await? {
        tracing::debug!(email = %req.email, "login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(email = %user.email, role = %user.role, "login successful");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        role: user.role.to_uppercase(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: i64,
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    // Validate email format
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    // Validate password strength (minimum 8 characters)
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }

    let request = CreateUserRequest {
        name: req.name,
        email: req.email,
        password: req.password,
        role: "user".to_string(),
    };

    let user = state.service_context.user_repo.create(request).await
        .map_err(|e| match e {
            AppError::Database(msg) if msg.contains("UNIQUE") => {
                AppError::Conflict("Email already registered".to_string())
            }
            _ => e,
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            message: "Registration successful".to_string(),
        }),
    ))
}
