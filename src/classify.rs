//! Content classification
//!
//! MIME-type detection from file extensions and the text/binary decision
//! used by the read path. Pure functions, no filesystem access.

use std::path::Path;

use crate::error::{FsError, FsResult};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a MIME type from the file extension, if any.
pub fn mime_for(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Whether a MIME type denotes content we treat as binary without
/// attempting a text decode.
pub fn is_binary_mime(mime: &str) -> bool {
    mime.starts_with("image/")
        || mime.starts_with("audio/")
        || mime.starts_with("video/")
        || mime == OCTET_STREAM
}

/// Decode bytes as text in the requested encoding.
///
/// Only UTF-8 (the default) is supported; callers fall back to a binary
/// representation when this fails.
pub fn decode_text(bytes: &[u8], encoding: Option<&str>) -> FsResult<String> {
    match encoding.map(|e| e.to_ascii_lowercase()).as_deref() {
        None | Some("utf-8") | Some("utf8") => std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|e| FsError::Decode(format!("invalid UTF-8 at byte {}", e.valid_up_to()))),
        Some(other) => Err(FsError::Decode(format!("unsupported encoding: {other}"))),
    }
}

/// Coarse kind tag for media reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Blob,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Blob => "blob",
        }
    }
}

// Fixed table for read_media_file; anything else is served as a blob
const MEDIA_TYPES: &[(&str, &str, MediaKind)] = &[
    ("png", "image/png", MediaKind::Image),
    ("jpg", "image/jpeg", MediaKind::Image),
    ("jpeg", "image/jpeg", MediaKind::Image),
    ("gif", "image/gif", MediaKind::Image),
    ("webp", "image/webp", MediaKind::Image),
    ("bmp", "image/bmp", MediaKind::Image),
    ("svg", "image/svg+xml", MediaKind::Image),
    ("ico", "image/x-icon", MediaKind::Image),
    ("mp3", "audio/mpeg", MediaKind::Audio),
    ("wav", "audio/wav", MediaKind::Audio),
    ("ogg", "audio/ogg", MediaKind::Audio),
    ("flac", "audio/flac", MediaKind::Audio),
    ("m4a", "audio/mp4", MediaKind::Audio),
];

/// Map an extension to a media MIME type and kind tag.
pub fn media_type(path: &Path) -> (String, MediaKind) {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    for (known, mime, kind) in MEDIA_TYPES {
        if ext == *known {
            return (mime.to_string(), *kind);
        }
    }

    (OCTET_STREAM.to_string(), MediaKind::Blob)
}
