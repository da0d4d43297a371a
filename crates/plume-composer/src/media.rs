use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024; // 50 MB
pub const MAX_PREVIEW_BYTES: u64 = 5 * 1024 * 1024; // 5 MB

const PROGRESS_STEP: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File is too large ({size} bytes, limit {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Cannot read file: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Kind and MIME type from the file extension.
pub fn classify(path: &Path) -> Option<(MediaKind, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let found = match ext.as_str() {
        "jpg" | "jpeg" => (MediaKind::Image, "image/jpeg"),
        "png" => (MediaKind::Image, "image/png"),
        "gif" => (MediaKind::Image, "image/gif"),
        "webp" => (MediaKind::Image, "image/webp"),
        "mp4" => (MediaKind::Video, "video/mp4"),
        "mov" => (MediaKind::Video, "video/quicktime"),
        _ => return None,
    };
    Some(found)
}

/// A file accepted by the uploader.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub id: String,
    pub source: PathBuf,
    pub kind: MediaKind,
    pub mime_type: &'static str,
    pub size: u64,
    /// `data:` URL for small images.
    pub preview: Option<String>,
    /// `None` until an upload starts.
    pub upload_progress: Option<u8>,
    pub error: Option<String>,
}

impl MediaItem {
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn is_uploaded(&self) -> bool {
        self.upload_progress == Some(100) && self.error.is_none()
    }
}

/// Validate a file and build its [`MediaItem`].
pub async fn accept(path: &Path) -> Result<MediaItem, MediaError> {
    let (kind, mime_type) = classify(path)
        .ok_or_else(|| MediaError::UnsupportedType(path.display().to_string()))?;

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| MediaError::Io(e.to_string()))?
        .len();
    if size > MAX_MEDIA_BYTES {
        return Err(MediaError::TooLarge {
            size,
            max: MAX_MEDIA_BYTES,
        });
    }

    let preview = if kind == MediaKind::Image && size <= MAX_PREVIEW_BYTES {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;
        Some(format!("data:{};base64,{}", mime_type, B64.encode(bytes)))
    } else {
        None
    };

    Ok(MediaItem {
        id: Uuid::new_v4().to_string(),
        source: path.to_path_buf(),
        kind,
        mime_type,
        size,
        preview,
        upload_progress: None,
        error: None,
    })
}

/// Simulated upload: progress climbs 0 to 100 in steps, one step per
/// `step_delay`, mirrored into `progress`. The source file must still exist.
pub async fn simulate_upload(
    item: &mut MediaItem,
    step_delay: Duration,
    progress: &watch::Sender<u8>,
) -> Result<(), MediaError> {
    item.error = None;
    item.upload_progress = Some(0);
    let _ = progress.send(0);

    let mut done = 0u8;
    while done < 100 {
        tokio::time::sleep(step_delay).await;
        if let Err(e) = tokio::fs::metadata(&item.source).await {
            let err = MediaError::Io(e.to_string());
            warn!(media_id = %item.id, "Upload failed: {}", err);
            item.upload_progress = None;
            item.error = Some(err.to_string());
            return Err(err);
        }
        done = (done + PROGRESS_STEP).min(100);
        item.upload_progress = Some(done);
        let _ = progress.send(done);
    }

    debug!(media_id = %item.id, file = %item.file_name(), "Upload complete");
    Ok(())
}
