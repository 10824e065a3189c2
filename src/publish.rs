//! Article publishing workflow.
//!
//! Validate → insert → finalize, in that order: the upload is validated
//! entirely in memory before the article row is inserted, so a rejected
//! submission leaves no row, no directory, and no file behind. Rejections
//! are outcomes, not errors — the caller redirects silently; only store
//! and filesystem failures are `Err`.

use crate::media::{self, UploadRejection};
use crate::render::{self, RenderError};
use crate::store::{Article, NewArticle, Store, StoreError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A submitted file, already read into memory.
#[derive(Debug)]
pub struct Upload {
    /// Client-supplied name; path components are stripped before use.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The fields of a new-article submission.
#[derive(Debug)]
pub struct Submission {
    pub title: String,
    pub body: String,
    pub upload: Option<Upload>,
}

/// What a non-failing publish attempt produced.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Article row, directory, media file, and snapshot all exist.
    Created(i64),
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Title or body empty after trimming.
    EmptyField,
    Upload(UploadRejection),
}

/// Publish one article: validate the submission, insert the row, create
/// the article directory, persist the media file, write the initial
/// snapshot (empty comment list).
pub async fn publish(
    store: &Store,
    root: &Path,
    submission: Submission,
) -> Result<PublishOutcome, PublishError> {
    let title = submission.title.trim().to_string();
    let body = submission.body.trim().to_string();
    if title.is_empty() || body.is_empty() {
        debug!("rejected submission with empty title or body");
        return Ok(PublishOutcome::Rejected(Rejection::EmptyField));
    }

    // An upload field without a filename is a form submitted with the file
    // input left blank.
    let upload = submission.upload.and_then(|u| {
        let filename = media::sanitize_filename(&u.filename);
        if filename.is_empty() {
            None
        } else {
            Some(Upload {
                filename,
                bytes: u.bytes,
            })
        }
    });

    if let Some(upload) = &upload
        && let Err(rejection) = media::validate_upload(&upload.filename, &upload.bytes)
    {
        debug!(filename = %upload.filename, ?rejection, "rejected upload");
        return Ok(PublishOutcome::Rejected(Rejection::Upload(rejection)));
    }

    let media_name = upload.as_ref().map(|u| u.filename.clone());
    let id = store
        .insert_article(NewArticle {
            title: title.clone(),
            content: body.clone(),
            media: media_name.clone(),
        })
        .await?;

    let article_dir = root.join(id.to_string());
    tokio::fs::create_dir_all(&article_dir).await?;

    if let Some(upload) = &upload {
        tokio::fs::write(article_dir.join(&upload.filename), &upload.bytes).await?;
    }

    let article = Article {
        id,
        title,
        content: body,
        media: media_name,
    };
    render::write_snapshot(root, &article, &[])?;

    info!(id, media = article.media.as_deref().unwrap_or("none"), "published article");
    Ok(PublishOutcome::Created(id))
}
