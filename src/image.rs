//! Converts image files into self-contained `data:` URIs so they can be
//! stored in a record's `imageUrl` field.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Result, StallError};

/// Default upper bound on ingested file size (5 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Reads `path` and encodes it as `data:<mime>;base64,<payload>`.
///
/// Fails with `UnreadableFile` when the file cannot be read or is empty,
/// and with `ImageTooLarge` when it exceeds `max_bytes`. Nothing is
/// persisted here; callers attach the result to a record afterwards.
pub async fn ingest(path: impl AsRef<Path>, max_bytes: u64) -> Result<String> {
    let path = path.as_ref();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| unreadable(path, source))?;
    if !metadata.is_file() {
        return Err(unreadable(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    if metadata.len() > max_bytes {
        return Err(StallError::ImageTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| unreadable(path, source))?;
    if bytes.is_empty() {
        return Err(unreadable(
            path,
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "file is empty"),
        ));
    }

    let mime = sniff_mime(&bytes)
        .or_else(|| mime_from_extension(path))
        .unwrap_or(FALLBACK_MIME);

    tracing::debug!("Ingested {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(encode_data_uri(&bytes, mime))
}

pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// True for strings produced by `encode_data_uri` (or any data URI).
pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:")
}

fn unreadable(path: &Path, source: std::io::Error) -> StallError {
    StallError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    }
}

/// Detects common image formats from their magic bytes.
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
