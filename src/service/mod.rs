use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repository::*;

/// Shared handle to the repositories and services every handler needs.
pub struct ServiceContext {
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_service: Arc<AuthService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        announcement_repo: Arc<dyn AnnouncementRepository>,
        user_repo: Arc<dyn UserRepository>,
        auth_service: Arc<AuthService>,
        db_pool: SqlitePool,
    ) -> Self {
        Self {
            announcement_repo,
            user_repo,
            auth_service,
            db_pool,
        }
    }
}
