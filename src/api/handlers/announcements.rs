use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    api::{state::AppState, middleware::auth::CurrentUser},
    domain::{
        self, Announcement, AnnouncementChanges, Category, NewAnnouncement, DEFAULT_IMAGE,
    },
    error::{AppError, Result},
};

/// Payload for both create and update. Title and content are required but
/// arrive as options so that a missing field produces a clean 400 instead
/// of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AnnouncementPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    pub message: String,
    pub announcement: Announcement,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

struct ValidatedPayload {
    title: String,
    content: String,
    image: String,
    category: Category,
}

fn validate(payload: AnnouncementPayload) -> Result<ValidatedPayload> {
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Title and content are required".to_string()))?;
    let content = payload
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Title and content are required".to_string()))?;

    let category = match payload.category {
        Some(ref s) if !s.is_empty() => Category::parse(s)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid category: {}", s)))?,
        _ => Category::default(),
    };

    let image = payload
        .image
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

    Ok(ValidatedPayload { title, content, image, category })
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_repo.list().await?;

    Ok(Json(announcements))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Announcement>> {
    let announcement = state.service_context.announcement_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Announcement not found".to_string()))?;

    Ok(Json(announcement))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AnnouncementPayload>,
) -> Result<(StatusCode, Json<AnnouncementResponse>)> {
    let payload = validate(payload)?;

    tracing::info!(admin = %user.user.email, title = %payload.title, "creating announcement");

    let announcement = NewAnnouncement {
        excerpt: domain::excerpt_of(&payload.content),
        read_time: domain::read_time_of(&payload.content),
        date: domain::display_date(Utc::now()),
        title: payload.title,
        content: payload.content,
        image: payload.image,
        category: payload.category,
        author_id: user.user.id,
    };

    let created = state.service_context.announcement_repo.create(announcement).await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse {
            message: "Announcement created successfully".to_string(),
            announcement: created,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AnnouncementPayload>,
) -> Result<Json<AnnouncementResponse>> {
    // Full-replace update; 404 before validation side effects reach the db.
    state.service_context.announcement_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Announcement not found".to_string()))?;

    let payload = validate(payload)?;

    tracing::info!(admin = %user.user.email, id, "updating announcement");

    let changes = AnnouncementChanges {
        excerpt: domain::excerpt_of(&payload.content),
        read_time: domain::read_time_of(&payload.content),
        title: payload.title,
        content: payload.content,
        image: payload.image,
        category: payload.category,
    };

    let updated = state.service_context.announcement_repo.update(id, changes).await?;

    Ok(Json(AnnouncementResponse {
        message: "Announcement updated successfully".to_string(),
        announcement: updated,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DeleteResponse>> {
    // Existence check first so deleting a missing id is a 404, not a
    // silent success.
    state.service_context.announcement_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Announcement not found".to_string()))?;

    state.service_context.announcement_repo.delete(id).await?;

    tracing::info!(admin = %user.user.email, id, "announcement deleted");

    Ok(Json(DeleteResponse {
        message: "Announcement deleted successfully".to_string(),
    }))
}
