use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use townboard::{
    api,
    auth::AuthService,
    config::Settings,
    domain::CreateUserRequest,
    repository::{SqliteAnnouncementRepository, SqliteUserRepository, UserRepository},
    service::ServiceContext,
};

const ADMIN_EMAIL: &str = "admin@townhall.gov";
const ADMIN_PASSWORD: &str = "admin_password";

async fn test_app() -> anyhow::Result<Router> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let announcement_repo = Arc::new(SqliteAnnouncementRepository::new(pool.clone()));
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let auth_service = Arc::new(AuthService::new(user_repo.clone()));

    user_repo
        .create(CreateUserRequest {
            name: "Administrator".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            role: "admin".to_string(),
        })
        .await?;

    user_repo
        .create(CreateUserRequest {
            name: "Resident".to_string(),
            email: "resident@example.com".to_string(),
            password: "resident_password".to_string(),
            role: "user".to_string(),
        })
        .await?;

    let service_context = Arc::new(ServiceContext::new(
        announcement_repo,
        user_repo,
        auth_service,
        pool,
    ));

    Ok(api::create_app(service_context, Arc::new(Settings::default())))
}

fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", email));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn create_announcement(app: &Router, title: &str, content: &str) -> anyhow::Result<Value> {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/announcements",
            Some(ADMIN_EMAIL),
            Some(json!({ "title": title, "content": content })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    Ok(body_json(response).await?["announcement"].clone())
}

#[tokio::test]
async fn mutations_require_a_valid_admin_bearer() -> anyhow::Result<()> {
    let app = test_app().await?;
    let payload = json!({ "title": "T", "content": "C" });

    // No Authorization header at all
    let response = app
        .clone()
        .oneshot(request("POST", "/api/announcements", None, Some(payload.clone())))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A known user whose role is not "admin"
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/announcements",
            Some("resident@example.com"),
            Some(payload.clone()),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // An email nobody has
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/announcements/1",
            Some("nobody@example.com"),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Nothing was persisted by the rejected create
    let response = app
        .clone()
        .oneshot(request("GET", "/api/announcements", None, None))
        .await?;
    let listed = body_json(response).await?;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn create_derives_excerpt_read_time_and_defaults() -> anyhow::Result<()> {
    let app = test_app().await?;
    let content = "C".repeat(300);

    let announcement = create_announcement(&app, "Road resurfacing", &content).await?;

    assert_eq!(
        announcement["excerpt"].as_str().unwrap(),
        format!("{}...", "C".repeat(150))
    );
    assert_eq!(announcement["readTime"], "2 min read");
    assert_eq!(announcement["category"], "General");
    assert_eq!(announcement["image"], "/images/default-announcement.jpg");
    assert_eq!(announcement["author"]["email"], ADMIN_EMAIL);

    Ok(())
}

#[tokio::test]
async fn short_content_is_not_truncated() -> anyhow::Result<()> {
    let app = test_app().await?;

    let announcement = create_announcement(&app, "Notice", "Library closes early Friday.").await?;
    assert_eq!(announcement["excerpt"], "Library closes early Friday.");
    assert_eq!(announcement["readTime"], "1 min read");

    Ok(())
}

#[tokio::test]
async fn create_rejects_missing_or_blank_fields() -> anyhow::Result<()> {
    let app = test_app().await?;

    for payload in [
        json!({ "content": "body only" }),
        json!({ "title": "title only" }),
        json!({ "title": "  ", "content": "body" }),
    ] {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/announcements", Some(ADMIN_EMAIL), Some(payload)))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Unknown category label
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/announcements",
            Some(ADMIN_EMAIL),
            Some(json!({ "title": "T", "content": "C", "category": "Sports" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn list_is_public_and_newest_first() -> anyhow::Result<()> {
    let app = test_app().await?;

    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        let announcement = create_announcement(&app, title, "some municipal news").await?;
        ids.push(announcement["id"].as_i64().unwrap());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // No Authorization header: reads are public
    let response = app
        .clone()
        .oneshot(request("GET", "/api/announcements", None, None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(response).await?;
    let listed_ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed_ids, expected);

    Ok(())
}

#[tokio::test]
async fn get_handles_bad_and_missing_ids() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/announcements/not-a-number", None, None))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/announcements/9999", None, None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn update_recomputes_derived_fields_but_not_date() -> anyhow::Result<()> {
    let app = test_app().await?;

    let created = create_announcement(&app, "Snow plan", &"s".repeat(300)).await?;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/announcements/{}", id),
            Some(ADMIN_EMAIL),
            Some(json!({
                "title": "Snow plan (updated)",
                "content": "Plows start at 5am.",
                "category": "Emergency"
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    let updated = &body["announcement"];
    assert_eq!(updated["title"], "Snow plan (updated)");
    assert_eq!(updated["excerpt"], "Plows start at 5am.");
    assert_eq!(updated["readTime"], "1 min read");
    assert_eq!(updated["category"], "Emergency");
    assert_eq!(updated["date"], created["date"]);
    assert_eq!(updated["authorId"], created["authorId"]);

    Ok(())
}

#[tokio::test]
async fn update_of_missing_announcement_is_404() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/announcements/9999",
            Some(ADMIN_EMAIL),
            Some(json!({ "title": "T", "content": "C" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await?;
    assert_eq!(body["error"], "Announcement not found");

    Ok(())
}

#[tokio::test]
async fn delete_removes_the_record_and_404s_on_missing_ids() -> anyhow::Result<()> {
    let app = test_app().await?;

    let created = create_announcement(&app, "Temporary notice", "gone soon").await?;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/announcements/{}", id),
            Some(ADMIN_EMAIL),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["message"], "Announcement deleted successfully");

    // Deleting the same id again must not look like a success
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/announcements/{}", id),
            Some(ADMIN_EMAIL),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/announcements/{}", id), None, None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn login_returns_role_upper_cased() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["role"], "ADMIN");

    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> anyhow::Result<()> {
    let app = test_app().await?;

    // Wrong password for a real account
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await?;

    // Account that does not exist
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "whatever" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = body_json(response).await?;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Invalid email or password");

    Ok(())
}

#[tokio::test]
async fn register_creates_a_plain_user_account() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "New Resident",
                "email": "new@example.com",
                "password": "long-enough-password"
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The fresh account can log in but cannot write announcements
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "new@example.com", "password": "long-enough-password" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["role"], "USER");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/announcements",
            Some("new@example.com"),
            Some(json!({ "title": "T", "content": "C" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn register_validates_input_and_rejects_duplicates() -> anyhow::Result<()> {
    let app = test_app().await?;

    // Short password
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "X", "email": "x@example.com", "password": "short" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "X", "email": "not-an-email", "password": "long-enough-password" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Email already registered during setup
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Impostor",
                "email": "resident@example.com",
                "password": "long-enough-password"
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}
