use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod announcement_repository;
pub mod user_repository;

pub use announcement_repository::SqliteAnnouncementRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: NewAnnouncement) -> Result<Announcement>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    async fn list(&self) -> Result<Vec<Announcement>>;
    async fn update(&self, id: i64, changes: AnnouncementChanges) -> Result<Announcement>;
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<User>>;
}
