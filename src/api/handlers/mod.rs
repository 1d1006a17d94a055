pub mod announcements;
pub mod auth;
pub mod root;
