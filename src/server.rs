//! HTTP surface.
//!
//! Three routes carry the whole workflow: `GET /` renders the listing
//! live, `POST /` publishes an article from a multipart form, and
//! `POST /comment?id=N` appends a comment and regenerates the article's
//! snapshot. Everything else — snapshots, media files, the stylesheet —
//! is static file serving out of the data root.
//!
//! Validation failures redirect silently (303 to a safe page); store and
//! filesystem failures surface as 500s instead of leaving the store and
//! the rendered pages quietly out of sync.

use crate::comment::{self, CommentError, CommentOutcome};
use crate::config::Settings;
use crate::media;
use crate::publish::{self, PublishError, PublishOutcome, Submission, Upload};
use crate::render;
use crate::store::{Store, StoreError};
use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info};

/// Multipart transport ceiling: the upload cap plus headroom for the
/// other form fields and framing. The exact 20 MiB rule is enforced
/// against the decoded file bytes in `media::validate_upload`.
const BODY_LIMIT: usize = media::MAX_UPLOAD_BYTES as usize + 1024 * 1024;

/// Shared state handed to every handler.
pub struct AppState {
    pub store: Store,
    pub settings: Settings,
    pub root: PathBuf,
    /// Serializes fetch-render-write sequences so concurrent submissions
    /// cannot interleave their writes to a snapshot file.
    render_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: Store, settings: Settings, root: PathBuf) -> Self {
        Self {
            store,
            settings,
            root,
            render_lock: Mutex::new(()),
        }
    }
}

/// Request-fatal failures. Everything here is a 500; validation problems
/// never reach this type.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Comment(#[from] CommentError),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
    }
}

/// Build the application router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(state.root.clone());

    Router::new()
        .route("/", get(listing).post(create_article))
        .route("/comment", post(post_comment))
        .route("/health", get(health))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("shutting down");
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> &'static str {
    "OK"
}

async fn listing(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServeError> {
    let articles = state.store.list_articles().await?;
    let page = render::listing_page(&state.settings.site_title, &articles);
    Ok(Html(page.into_string()))
}

async fn create_article(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, ServeError> {
    let mut title = String::new();
    let mut body = String::new();
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // Malformed or oversized body: same silent redirect as any
            // other rejected submission.
            Err(err) => {
                debug!(%err, "unreadable multipart body");
                return Ok(Redirect::to("/"));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" | "articleText" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(err) => {
                        debug!(%err, field = %name, "unreadable form field");
                        return Ok(Redirect::to("/"));
                    }
                };
                if name == "title" {
                    title = value;
                } else {
                    body = value;
                }
            }
            "upload" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        debug!(%err, "unreadable upload field");
                        return Ok(Redirect::to("/"));
                    }
                };
                if !filename.is_empty() {
                    upload = Some(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let _guard = state.render_lock.lock().await;
    let submission = Submission { title, body, upload };
    match publish::publish(&state.store, &state.root, submission).await? {
        PublishOutcome::Created(_) | PublishOutcome::Rejected(_) => Ok(Redirect::to("/")),
    }
}

#[derive(Deserialize)]
struct CommentQuery {
    id: Option<String>,
}

#[derive(Deserialize)]
struct CommentForm {
    #[serde(default)]
    comment: String,
}

async fn post_comment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentQuery>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, ServeError> {
    // The id must be a plain positive integer; anything else goes back to
    // the listing with no side effects.
    let Some(id) = query.id.as_deref().and_then(|raw| raw.parse::<i64>().ok()) else {
        debug!(id = ?query.id, "comment with unparseable article id");
        return Ok(Redirect::to("/"));
    };

    let _guard = state.render_lock.lock().await;
    match comment::append(&state.store, &state.root, id, &form.comment).await? {
        CommentOutcome::Regenerated(id) => Ok(Redirect::to(&format!("/{id}/index.html"))),
        CommentOutcome::UnknownArticle => Ok(Redirect::to("/")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_router() -> (TempDir, Router) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(&tmp.path().join("articles.db")).await.unwrap();
        let state = Arc::new(AppState::new(
            store,
            Settings::default(),
            tmp.path().to_path_buf(),
        ));
        (tmp, router(state))
    }

    fn multipart_request(fields: &[(&str, &str)]) -> Request<Body> {
        let boundary = "press-test-boundary";
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let (_tmp, app) = test_router().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn listing_renders_empty_site() {
        let (_tmp, app) = test_router().await;
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn publish_redirects_and_writes_snapshot() {
        let (tmp, app) = test_router().await;

        let request = multipart_request(&[
            ("title", "Opening Theory"),
            ("articleText", "The Sicilian is sharp."),
        ]);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");

        let html = std::fs::read_to_string(tmp.path().join("1").join("index.html")).unwrap();
        assert!(html.contains("Opening Theory"));
    }

    #[tokio::test]
    async fn rejected_submission_redirects_without_state() {
        let (tmp, app) = test_router().await;

        let request = multipart_request(&[("title", "   "), ("articleText", "body")]);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
        assert!(!tmp.path().join("1").exists());
    }

    #[tokio::test]
    async fn snapshot_is_served_statically() {
        let (_tmp, app) = test_router().await;

        let publish = multipart_request(&[("title", "t"), ("articleText", "b")]);
        app.clone().oneshot(publish).await.unwrap();

        let response = app
            .oneshot(Request::get("/1/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn comment_redirects_to_snapshot() {
        let (tmp, app) = test_router().await;

        let publish = multipart_request(&[("title", "t"), ("articleText", "b")]);
        app.clone().oneshot(publish).await.unwrap();

        let request = Request::post("/comment?id=1")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("comment=Nice+article%21"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/1/index.html");

        let html = std::fs::read_to_string(tmp.path().join("1").join("index.html")).unwrap();
        assert!(html.contains("Nice article!"));
    }

    #[tokio::test]
    async fn comment_with_bad_id_redirects_home() {
        let (_tmp, app) = test_router().await;

        for uri in ["/comment", "/comment?id=abc", "/comment?id=-2"] {
            let request = Request::post(uri)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("comment=x"))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()["location"], "/", "{uri}");
        }
    }

    #[tokio::test]
    async fn comment_on_unknown_article_redirects_home() {
        let (_tmp, app) = test_router().await;

        let request = Request::post("/comment?id=99")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("comment=x"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["location"], "/");
    }
}
