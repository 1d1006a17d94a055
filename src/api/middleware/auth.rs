use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Gate for announcement mutations.
///
/// Extracts `Authorization: Bearer <email>` and resolves it to an admin
/// account before the request body is ever touched. Missing header, bad
/// format, unknown email and non-admin role all end the request with 401.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?;

    let value = header.to_str().map_err(|_| AppError::Unauthorized)?;
    let token = value.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    let user = state.service_context.auth_service
        .authenticate_admin(token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(admin = %user.email, "admin request authenticated");

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}
