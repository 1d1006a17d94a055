use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{Announcement, AnnouncementChanges, Author, Category, NewAnnouncement},
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

// Database row struct, including the author columns pulled in by the join.
#[derive(FromRow)]
struct AnnouncementRow {
    id: i64,
    title: String,
    content: String,
    image: String,
    category: String,
    excerpt: String,
    read_time: String,
    date: String,
    created_at: NaiveDateTime,
    author_id: i64,
    author_name: String,
    author_email: String,
}

const SELECT_JOINED: &str = r#"
    SELECT a.id, a.title, a.content, a.image, a.category, a.excerpt,
           a.read_time, a.date, a.created_at, a.author_id,
           u.name AS author_name, u.email AS author_email
    FROM announcements a
    JOIN users u ON u.id = a.author_id
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: row.id,
            title: row.title,
            content: row.content,
            image: row.image,
            category: Category::parse(&row.category)
                .ok_or_else(|| AppError::Database(format!("Invalid category: {}", row.category)))?,
            excerpt: row.excerpt,
            read_time: row.read_time,
            date: row.date,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            author_id: row.author_id,
            author: Author {
                name: row.author_name,
                email: row.author_email,
            },
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: NewAnnouncement) -> Result<Announcement> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO announcements (
                title, content, image, category, excerpt, read_time,
                date, created_at, author_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(&announcement.image)
        .bind(announcement.category.as_str())
        .bind(&announcement.excerpt)
        .bind(&announcement.read_time)
        .bind(&announcement.date)
        .bind(now)
        .bind(announcement.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            &format!("{} WHERE a.id = ?", SELECT_JOINED)
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_announcement(r)?)),
            None => Ok(None)
        }
    }

    async fn list(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            &format!("{} ORDER BY a.created_at DESC, a.id DESC", SELECT_JOINED)
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn update(&self, id: i64, changes: AnnouncementChanges) -> Result<Announcement> {
        // date and author_id are fixed at creation and never touched here.
        sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, image = ?, category = ?,
                excerpt = ?, read_time = ?
            WHERE id = ?
            "#
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.image)
        .bind(changes.category.as_str())
        .bind(&changes.excerpt)
        .bind(&changes.read_time)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
