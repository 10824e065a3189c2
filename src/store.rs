//! SQLite-backed article and comment store.
//!
//! One [`Store`] is opened at startup and shared behind an `Arc` by every
//! entry point; the schema is created once here, not per request. SQLite
//! runs in WAL mode so overlapping readers never block on the single
//! writer.
//!
//! ## Schema
//!
//! ```text
//! articles(id, title, content, media)        media: uploaded filename or NULL
//! comments(comment_id, article_id, comment_text, created_at)
//! ```
//!
//! The `media` column makes the uploaded file an explicit attribute of the
//! article. Display order is `id DESC` for the listing and `comment_id ASC`
//! for a page's comments.

use rusqlite::{OptionalExtension, Row, params};
use std::path::Path;
use thiserror::Error;
use tokio_rusqlite::Connection;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    media TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL,
    comment_text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_article_id ON comments(article_id);
"#;

/// A published article as stored.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Filename of the media file inside the article directory, if any.
    pub media: Option<String>,
}

/// Fields for a not-yet-inserted article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub media: Option<String>,
}

/// A reader comment as stored.
#[derive(Debug, Clone)]
pub struct Comment {
    pub comment_id: i64,
    pub article_id: i64,
    pub comment_text: String,
    pub created_at: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and ensure the schema exists.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    pub async fn insert_article(&self, article: NewArticle) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO articles (title, content, media) VALUES (?1, ?2, ?3)",
                    params![article.title, article.content, article.media],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn article(&self, id: i64) -> Result<Option<Article>> {
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT id, title, content, media FROM articles WHERE id = ?1")?;
                let article = stmt
                    .query_row(params![id], |row| Ok(article_from_row(row)))
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    /// All articles, newest first — the listing page order.
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, title, content, media FROM articles ORDER BY id DESC")?;
                let articles = stmt
                    .query_map([], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn insert_comment(
        &self,
        article_id: i64,
        comment_text: String,
        created_at: String,
    ) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO comments (article_id, comment_text, created_at) VALUES (?1, ?2, ?3)",
                    params![article_id, comment_text, created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// All comments for one article in insertion order — the display order.
    pub async fn comments(&self, article_id: i64) -> Result<Vec<Comment>> {
        let comments = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT comment_id, article_id, comment_text, created_at \
                     FROM comments WHERE article_id = ?1 ORDER BY comment_id ASC",
                )?;
                let comments = stmt
                    .query_map(params![article_id], |row| Ok(comment_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(comments)
            })
            .await?;
        Ok(comments)
    }
}

fn article_from_row(row: &Row) -> Article {
    Article {
        id: row.get(0).unwrap(),
        title: row.get(1).unwrap(),
        content: row.get(2).unwrap(),
        media: row.get(3).unwrap(),
    }
}

fn comment_from_row(row: &Row) -> Comment {
    Comment {
        comment_id: row.get(0).unwrap(),
        article_id: row.get(1).unwrap(),
        comment_text: row.get(2).unwrap(),
        created_at: row.get(3).unwrap(),
    }
}
