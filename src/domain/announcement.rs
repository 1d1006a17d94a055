use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image used when an announcement is created without one.
pub const DEFAULT_IMAGE: &str = "/images/default-announcement.jpg";

const EXCERPT_LEN: usize = 150;
const READ_CHARS_PER_MINUTE: usize = 200;

/// A published municipal news item, joined with its author for display.
///
/// `excerpt`, `read_time` and `date` are derived columns: the first two are
/// recomputed from `content` on every create and update, while `date` is the
/// human-readable publication date fixed at creation and never recalculated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: String,
    pub category: Category,
    pub excerpt: String,
    pub read_time: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author: Author,
}

/// Author fields exposed alongside an announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    General,
    Housing,
    Infrastructure,
    Events,
    Emergency,
}

impl Category {
    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "General" => Some(Category::General),
            "Housing" => Some(Category::Housing),
            "Infrastructure" => Some(Category::Infrastructure),
            "Events" => Some(Category::Events),
            "Emergency" => Some(Category::Emergency),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Housing => "Housing",
            Category::Infrastructure => "Infrastructure",
            Category::Events => "Events",
            Category::Emergency => "Emergency",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

/// Fields persisted when creating an announcement. The derived columns are
/// filled in by the handler via [`excerpt_of`], [`read_time_of`] and
/// [`display_date`] before this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub image: String,
    pub category: Category,
    pub excerpt: String,
    pub read_time: String,
    pub date: String,
    pub author_id: i64,
}

/// Full-replace update. `date` and `author_id` are deliberately absent:
/// they are fixed at creation.
#[derive(Debug, Clone)]
pub struct AnnouncementChanges {
    pub title: String,
    pub content: String,
    pub image: String,
    pub category: Category,
    pub excerpt: String,
    pub read_time: String,
}

/// First 150 characters of the content plus an ellipsis, or the content
/// verbatim when it is short enough.
pub fn excerpt_of(content: &str) -> String {
    if content.chars().count() > EXCERPT_LEN {
        let head: String = content.chars().take(EXCERPT_LEN).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

/// Estimated reading time at 200 characters per minute, rounded up.
pub fn read_time_of(content: &str) -> String {
    let minutes = content.chars().count().div_ceil(READ_CHARS_PER_MINUTE);
    format!("{} min read", minutes)
}

/// Human-readable publication date, e.g. "January 5, 2025".
pub fn display_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}
