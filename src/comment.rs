//! Comment appending and snapshot regeneration.
//!
//! Every accepted request fully regenerates the article's snapshot —
//! title, body, media embed, and the complete comment list — rather than
//! appending incrementally. At this system's traffic a rebuild is cheap
//! and keeps the snapshot a pure function of stored state.
//!
//! The article's existence is checked before anything is inserted; an
//! unknown id is an outcome with no side effects.

use crate::render::{self, RenderError};
use crate::store::{Store, StoreError};
use chrono::Utc;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// What a non-failing append attempt produced.
#[derive(Debug, PartialEq, Eq)]
pub enum CommentOutcome {
    /// Snapshot regenerated; redirect to `/{id}/index.html`.
    Regenerated(i64),
    /// Id not positive or no such article; nothing was written.
    UnknownArticle,
}

/// Append a comment (when non-empty after trimming) and regenerate the
/// article's snapshot. The snapshot is rewritten even when the text is
/// empty, matching the always-regenerate contract.
pub async fn append(
    store: &Store,
    root: &Path,
    article_id: i64,
    text: &str,
) -> Result<CommentOutcome, CommentError> {
    if article_id < 1 {
        debug!(article_id, "comment on non-positive article id");
        return Ok(CommentOutcome::UnknownArticle);
    }

    let Some(article) = store.article(article_id).await? else {
        debug!(article_id, "comment on unknown article");
        return Ok(CommentOutcome::UnknownArticle);
    };

    let text = text.trim();
    if !text.is_empty() {
        let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        store
            .insert_comment(article_id, text.to_string(), created_at)
            .await?;
        info!(article_id, "comment appended");
    }

    let comments = store.comments(article_id).await?;
    render::write_snapshot(root, &article, &comments)?;

    Ok(CommentOutcome::Regenerated(article_id))
}
