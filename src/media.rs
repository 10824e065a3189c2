//! Upload validation and media classification.
//!
//! Uploads are accepted only when three independent checks pass: size cap,
//! extension allowlist, and a magic-byte sniff whose result must match the
//! MIME type the extension claims. A `.png` containing JPEG data is
//! rejected even though both types are individually allowed.
//!
//! The extension also decides how the renderer embeds the file: `mp4` and
//! `webm` become a `<video>` element, everything else an `<img>`.

/// Hard cap on upload size. A file of exactly this many bytes is accepted.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Accepted upload extensions (compared lowercased).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "mp4", "webm"];

/// How a media file is embedded in the article page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Why an upload was rejected. Every variant maps to a silent redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    TooLarge,
    UnsupportedExtension,
    ContentMismatch,
}

/// Lowercased extension of a filename, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Embed rule: `mp4`/`webm` are videos, any other extension is an image.
pub fn kind_for(filename: &str) -> MediaKind {
    match extension_of(filename).as_deref() {
        Some("mp4") | Some("webm") => MediaKind::Video,
        _ => MediaKind::Image,
    }
}

/// MIME type corresponding to an allowed extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Identify the content type from the file's leading bytes.
///
/// Only the six allowed types are recognized; anything else is `None`.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 8 && bytes[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some("image/png");
    }
    if bytes.len() >= 3 && bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return Some("image/jpeg");
    }
    if bytes.len() >= 4 && bytes[..4] == [0x47, 0x49, 0x46, 0x38] {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return Some("video/mp4");
    }
    // EBML header, shared by WebM and Matroska
    if bytes.len() >= 4 && bytes[..4] == [0x1A, 0x45, 0xDF, 0xA3] {
        return Some("video/webm");
    }
    None
}

/// Strip any path components from a client-supplied filename.
///
/// Browsers send bare names, but nothing stops a hand-crafted request from
/// sending `../../etc/passwd`; only the final component survives.
pub fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}

/// Run the full validation pipeline over an upload.
pub fn validate_upload(filename: &str, bytes: &[u8]) -> Result<(), UploadRejection> {
    if bytes.len() as u64 > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge);
    }

    let ext = extension_of(filename).ok_or(UploadRejection::UnsupportedExtension)?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadRejection::UnsupportedExtension);
    }

    let claimed = mime_for_extension(&ext).ok_or(UploadRejection::UnsupportedExtension)?;
    match sniff_mime(bytes) {
        Some(detected) if detected == claimed => Ok(()),
        _ => Err(UploadRejection::ContentMismatch),
    }
}
