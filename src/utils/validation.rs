use std::fmt;

use crate::models::PostContent;

/// Maximum image size: 10 MiB (inclusive)
pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum video size: 100 MiB (inclusive)
pub const MAX_VIDEO_SIZE: u64 = 100 * 1024 * 1024;

/// Supported image MIME types
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Supported video MIME types
pub const SUPPORTED_VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm"];

/// Category of a single content validation failure. Callers map these to the
/// API error kinds by category, never by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorKind {
    Empty,
    UnsupportedFormat,
    TooLarge,
}

#[derive(Debug, Clone)]
pub struct ContentError {
    pub kind: ContentErrorKind,
    pub message: String,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Strips parameters and normalizes case, e.g. "Image/JPEG; q=1" -> "image/jpeg".
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_lowercase()
}

pub fn is_supported_image(mime: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&normalize_mime(mime).as_str())
}

pub fn is_supported_video(mime: &str) -> bool {
    SUPPORTED_VIDEO_TYPES.contains(&normalize_mime(mime).as_str())
}

/// Validates post content, accumulating every independent failure instead of
/// short-circuiting on the first.
///
/// Text is invalid iff it is empty after trimming. Image and video content
/// needs at least one of a media URL or a MIME type; a present MIME type must
/// be in the supported set and a present file size must not exceed the
/// per-category ceiling (exactly at the limit is valid).
pub fn validate_content(content: &PostContent) -> Vec<ContentError> {
    let mut errors = Vec::new();

    match content {
        PostContent::Text { text } => {
            if text.trim().is_empty() {
                errors.push(ContentError {
                    kind: ContentErrorKind::Empty,
                    message: "Text content cannot be empty".to_string(),
                });
            }
        }
        PostContent::Image {
            media_url,
            mime_type,
            file_size,
        } => {
            validate_media_fields(
                "Image",
                media_url,
                mime_type,
                file_size,
                SUPPORTED_IMAGE_TYPES,
                MAX_IMAGE_SIZE,
                &mut errors,
            );
        }
        PostContent::Video {
            media_url,
            mime_type,
            file_size,
        } => {
            validate_media_fields(
                "Video",
                media_url,
                mime_type,
                file_size,
                SUPPORTED_VIDEO_TYPES,
                MAX_VIDEO_SIZE,
                &mut errors,
            );
        }
    }

    errors
}

#[allow(clippy::too_many_arguments)]
fn validate_media_fields(
    label: &str,
    media_url: &Option<String>,
    mime_type: &Option<String>,
    file_size: &Option<u64>,
    supported: &[&str],
    max_size: u64,
    errors: &mut Vec<ContentError>,
) {
    if media_url.is_none() && mime_type.is_none() {
        errors.push(ContentError {
            kind: ContentErrorKind::Empty,
            message: format!("{} content requires a media URL or MIME type", label),
        });
    }

    if let Some(mime) = mime_type {
        if !supported.contains(&normalize_mime(mime).as_str()) {
            errors.push(ContentError {
                kind: ContentErrorKind::UnsupportedFormat,
                message: format!("Unsupported {} format: {}", label.to_lowercase(), mime),
            });
        }
    }

    if let Some(size) = file_size {
        if *size > max_size {
            errors.push(ContentError {
                kind: ContentErrorKind::TooLarge,
                message: format!(
                    "{} size {} bytes exceeds maximum allowed {} bytes",
                    label, size, max_size
                ),
            });
        }
    }
}
