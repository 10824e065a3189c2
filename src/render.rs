//! Static page rendering.
//!
//! One renderer serves every workflow: the publisher's initial snapshot,
//! the comment appender's regeneration, the `rebuild` command, and the
//! live listing page all call the same pure functions here. A snapshot is
//! a complete HTML document derived only from (article, comments), so
//! rendering the same state twice is byte-identical.
//!
//! ## Output Structure
//!
//! ```text
//! root/
//! ├── articles.db            # the store (not written here)
//! ├── style.css              # installed from the compiled-in asset
//! ├── 1/
//! │   ├── index.html         # snapshot, rewritten on every comment
//! │   └── board.png          # media file (written by the publisher)
//! └── 2/
//!     └── index.html
//! ```
//!
//! ## Escaping
//!
//! HTML is generated with [maud](https://maud.lambda.xyz/); all user text
//! interpolation is auto-escaped. Multi-line text (article bodies, comment
//! text) is emitted line by line with `<br>` between lines, so escaping
//! happens before line breaking and literal `<`/`>`/`&` always survive.
//!
//! ## Assets
//!
//! The stylesheet and the theme-toggle script are embedded at compile
//! time. Pages reference `style.css` by relative path; the script is
//! inlined into each generated head.

use crate::media::{self, MediaKind};
use crate::store::{Article, Comment};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const THEME_JS: &str = include_str!("../static/theme.js");
const LISTING_JS: &str = include_str!("../static/listing.js");

/// Write (or overwrite) an article's snapshot at `{root}/{id}/index.html`.
///
/// Creates the article directory if it does not exist yet, which also
/// covers `rebuild` runs over a fresh data root.
pub fn write_snapshot(root: &Path, article: &Article, comments: &[Comment]) -> Result<(), RenderError> {
    let dir = root.join(article.id.to_string());
    fs::create_dir_all(&dir)?;
    let page = article_page(article, comments);
    fs::write(dir.join("index.html"), page.into_string())?;
    Ok(())
}

/// Install the compiled-in stylesheet at `{root}/style.css`.
///
/// Snapshots reference it relatively, so it must exist before the first
/// article page is served.
pub fn install_stylesheet(root: &Path) -> Result<(), RenderError> {
    fs::write(root.join("style.css"), CSS_STATIC)?;
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
fn base_document(title: &str, stylesheet: &str, head_script: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(stylesheet);
                script { (PreEscaped(head_script)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Escape-then-break: each line is interpolated (and therefore escaped) on
/// its own, with `<br>` between lines.
fn multiline(text: &str) -> Markup {
    html! {
        @for (i, line) in text.lines().enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

/// Media embed for an article's uploaded file. The extension decides the
/// element: `mp4`/`webm` become `<video>`, everything else `<img>`.
fn media_block(filename: &str) -> Markup {
    match media::kind_for(filename) {
        MediaKind::Video => {
            let ext = media::extension_of(filename).unwrap_or_default();
            html! {
                div.media-container {
                    video.video-player controls {
                        source src=(filename) type={ "video/" (ext) };
                        "Your browser does not support the video tag."
                    }
                }
            }
        }
        MediaKind::Image => html! {
            div.media-container {
                img.image-uploaded src=(filename) alt="Uploaded";
            }
        },
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the complete snapshot document for one article.
pub fn article_page(article: &Article, comments: &[Comment]) -> Markup {
    let comment_action = format!("/comment?id={}", article.id);

    let content = html! {
        div.article-top-bar {
            button.back-button onclick="window.location.href='/'" { "« Back" }
            button.theme-button onclick="toggleTheme()" { "Toggle Theme" }
        }
        div.article-container {
            h1.article-title { (article.title) }
            div.article-body { (multiline(&article.content)) }
            @if let Some(filename) = &article.media {
                (media_block(filename))
            }

            h2.comments-title { "Comments" }
            form.comment-form action=(comment_action) method="post" {
                label.comment-label for="comment" { "Add a comment:" }
                br;
                textarea.comment-textarea name="comment" id="comment" rows="4" cols="50" required {}
                br;
                br;
                button.comment-submit type="submit" { "Submit Comment" }
            }

            div id="comment-list" class="comment-list" {
                @for comment in comments {
                    div.comment-item { (multiline(&comment.comment_text)) }
                }
            }
        }
    };

    base_document(&article.title, "../style.css", THEME_JS, content)
}

/// Renders the listing page: submission form plus all articles, newest
/// first, each linking to its snapshot.
pub fn listing_page(site_title: &str, articles: &[Article]) -> Markup {
    let head_script = format!("{THEME_JS}\n{LISTING_JS}");

    let content = html! {
        div.container {
            div.top-bar {
                h1.main-title { (site_title) }
                button.theme-button onclick="toggleTheme()" { "Toggle Theme" }
            }

            button.new-article-btn type="button" onclick="toggleNewArticleForm()" {
                "New Article"
            }

            div id="newArticleFormContainer" style="display: none;" {
                form.article-form action="/" method="post" enctype="multipart/form-data" {
                    div.form-group {
                        label.form-label for="title" { "Article Title:" }
                        br;
                        input.form-input type="text" name="title" id="title" required maxlength="100";
                    }
                    div.form-group {
                        label.form-label for="articleText" { "Article Text:" }
                        br;
                        textarea.form-textarea name="articleText" id="articleText" rows="6" cols="60" required {}
                    }
                    div.form-group {
                        label.form-label for="upload" { "Image or Video (optional):" }
                        br;
                        input.form-input type="file" name="upload" id="upload"
                            accept=".png,.jpg,.jpeg,.gif,.webp,.mp4,.webm";
                        p.allowed-types { "Allowed: PNG, JPG, JPEG, GIF, WEBP, MP4, WEBM. Max 20MB" }
                    }
                    div.form-group {
                        button.submit-article-btn type="submit" { "Submit Article" }
                    }
                }
            }

            hr;
            h2.articles-list-title { "Articles" }
            ul.articles-list {
                @for article in articles {
                    li.article-link-item {
                        a.article-link href={ (article.id) "/index.html" } {
                            (article.title)
                        }
                    }
                }
            }
        }
    };

    base_document(site_title, "style.css", &head_script, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, title: &str, content: &str, media: Option<&str>) -> Article {
        Article {
            id,
            title: title.to_string(),
            content: content.to_string(),
            media: media.map(String::from),
        }
    }

    fn comment(id: i64, article_id: i64, text: &str) -> Comment {
        Comment {
            comment_id: id,
            article_id,
            comment_text: text.to_string(),
            created_at: "2026-08-06 12:00:00".to_string(),
        }
    }

    #[test]
    fn article_page_contains_title_and_body() {
        let a = article(
            1,
            "Opening Theory",
            "The Sicilian is sharp.\nPlay carefully.",
            None,
        );
        let html = article_page(&a, &[]).into_string();

        assert!(html.contains(r#"<h1 class="article-title">Opening Theory</h1>"#));
        assert!(html.contains("The Sicilian is sharp.<br>Play carefully."));
        assert!(!html.contains("media-container"));
    }

    #[test]
    fn article_page_escapes_user_text() {
        let a = article(1, "<b>bold</b>", "a & b < c", None);
        let html = article_page(&a, &[]).into_string();

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("a &amp; b &lt; c"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn comment_script_stays_escaped() {
        let a = article(1, "t", "b", None);
        let c = comment(1, 1, "<script>alert(1)</script>");
        let html = article_page(&a, &[c]).into_string();

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn comment_items_render_in_order() {
        let a = article(1, "t", "b", None);
        let comments = vec![
            comment(1, 1, "Nice article!"),
            comment(2, 1, "second"),
            comment(3, 1, "third"),
        ];
        let html = article_page(&a, &comments).into_string();

        assert!(html.contains(r#"<div class="comment-item">Nice article!</div>"#));
        let first = html.find("Nice article!").unwrap();
        let second = html.find("second").unwrap();
        let third = html.find("third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn single_comment_renders_exactly_one_item() {
        let a = article(1, "t", "b", None);
        let html = article_page(&a, &[comment(1, 1, "Nice article!")]).into_string();
        assert_eq!(html.matches(r#"<div class="comment-item">"#).count(), 1);
    }

    #[test]
    fn comment_newlines_become_breaks_after_escaping() {
        let a = article(1, "t", "b", None);
        let c = comment(1, 1, "line one\nline <two>");
        let html = article_page(&a, &[c]).into_string();
        assert!(html.contains("line one<br>line &lt;two&gt;"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = article(7, "t", "line\nline", Some("clip.mp4"));
        let comments = vec![comment(1, 7, "a"), comment(2, 7, "b")];
        let once = article_page(&a, &comments).into_string();
        let twice = article_page(&a, &comments).into_string();
        assert_eq!(once, twice);
    }

    #[test]
    fn video_media_renders_video_element() {
        let a = article(1, "t", "b", Some("clip.mp4"));
        let html = article_page(&a, &[]).into_string();

        assert!(html.contains("<video"));
        assert!(html.contains(r#"src="clip.mp4""#));
        assert!(html.contains(r#"type="video/mp4""#));
    }

    #[test]
    fn webm_extension_matches_case_insensitively() {
        let a = article(1, "t", "b", Some("clip.WEBM"));
        let html = article_page(&a, &[]).into_string();

        assert!(html.contains("<video"));
        assert!(html.contains(r#"type="video/webm""#));
    }

    #[test]
    fn image_media_renders_img_element() {
        let a = article(1, "t", "b", Some("board.png"));
        let html = article_page(&a, &[]).into_string();

        assert!(html.contains(r#"<img class="image-uploaded" src="board.png""#));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn comment_form_targets_the_appender() {
        let a = article(42, "t", "b", None);
        let html = article_page(&a, &[]).into_string();
        assert!(html.contains(r#"action="/comment?id=42""#));
    }

    #[test]
    fn article_page_links_parent_stylesheet() {
        let a = article(1, "t", "b", None);
        let html = article_page(&a, &[]).into_string();
        assert!(html.contains(r#"href="../style.css""#));
    }

    #[test]
    fn listing_links_articles_newest_first_as_given() {
        let articles = vec![article(2, "Second", "b", None), article(1, "First", "b", None)];
        let html = listing_page("Chess Articles", &articles).into_string();

        assert!(html.contains(r#"href="2/index.html""#));
        assert!(html.contains(r#"href="1/index.html""#));
        let second = html.find("Second").unwrap();
        let first = html.find("First").unwrap();
        assert!(second < first);
    }

    #[test]
    fn listing_contains_submission_form() {
        let html = listing_page("Chess Articles", &[]).into_string();

        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="title""#));
        assert!(html.contains(r#"name="articleText""#));
        assert!(html.contains(r#"name="upload""#));
    }

    #[test]
    fn listing_escapes_article_titles() {
        let articles = vec![article(1, "<script>x</script>", "b", None)];
        let html = listing_page("Chess Articles", &articles).into_string();
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }

    #[test]
    fn base_document_includes_doctype() {
        let a = article(1, "t", "b", None);
        let html = article_page(&a, &[]).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn snapshot_write_creates_directory_and_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = article(3, "Opening Theory", "body", None);

        write_snapshot(tmp.path(), &a, &[]).unwrap();

        let snapshot = tmp.path().join("3").join("index.html");
        let html = fs::read_to_string(snapshot).unwrap();
        assert!(html.contains("Opening Theory"));
    }

    #[test]
    fn stylesheet_install_writes_asset() {
        let tmp = tempfile::TempDir::new().unwrap();
        install_stylesheet(tmp.path()).unwrap();
        let css = fs::read_to_string(tmp.path().join("style.css")).unwrap();
        assert!(css.contains("comment-item"));
    }
}
