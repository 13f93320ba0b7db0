use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rand::distributions::{Alphanumeric, DistString};
use serde_json::json;
use tokio::io::AsyncWriteExt;

use crate::auth::RequestIdentity;
use crate::db::models::NewVideo;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const ALLOWED_VIDEO_TYPES: &[&str] =
    &["video/mp4", "video/webm", "video/quicktime", "video/ogg"];

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos).post(upload_video))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// A video file written to disk but not yet recorded in the database.
struct StoredFile {
    path: PathBuf,
    file_name: String,
    content_type: String,
    size: u64,
}

impl StoredFile {
    async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Content type of an uploaded part, falling back to its file extension.
fn video_content_type(declared: Option<&str>, original_name: Option<&str>) -> Option<String> {
    declared
        .filter(|ct| *ct != "application/octet-stream")
        .map(str::to_string)
        .or_else(|| {
            original_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
        })
        .filter(|ct| ALLOWED_VIDEO_TYPES.contains(&ct.as_str()))
}

/// Extension for the stored file: the client's own if it looks sane,
/// otherwise one derived from the content type.
fn file_extension(original_name: Option<&str>, content_type: &str) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    from_name
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

fn stored_file_name(ext: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 10);
    format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase(),
        ext
    )
}

async fn store_field(mut field: Field<'_>, dir: &Path) -> AppResult<StoredFile> {
    let original_name = field.file_name().map(str::to_string);
    let content_type = video_content_type(field.content_type(), original_name.as_deref())
        .ok_or_else(|| AppError::BadRequest("file must be a video (mp4, webm, mov, ogg)".into()))?;

    let file_name = stored_file_name(&file_extension(original_name.as_deref(), &content_type));
    let path = dir.join(&file_name);
    let mut file = tokio::fs::File::create(&path).await?;
    let mut stored = StoredFile {
        path,
        file_name,
        content_type,
        size: 0,
    };

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                stored.discard().await;
                return Err(multipart_error(e));
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            stored.discard().await;
            return Err(e.into());
        }
        stored.size += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(stored)
}

/// POST /videos: multipart `title`, `desc`, `file`.
async fn upload_video(
    State(state): State<AppState>,
    identity: RequestIdentity,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let dir = state.config.videos_path();
    tokio::fs::create_dir_all(&dir).await?;

    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut stored: Option<StoredFile> = None;

    let parsed = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "title" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    title = Some(text.trim().to_string()).filter(|t| !t.is_empty());
                }
                "desc" => {
                    description = field.text().await.map_err(multipart_error)?.trim().to_string();
                }
                "file" if stored.is_none() => {
                    stored = Some(store_field(field, &dir).await?);
                }
                _ => {}
            }
        }
        Ok::<(), AppError>(())
    }
    .await;

    let (title, file) = match (parsed, title, stored) {
        (Ok(()), Some(title), Some(file)) => (title, file),
        (result, _, file) => {
            if let Some(file) = file {
                file.discard().await;
            }
            result?;
            return Err(AppError::BadRequest("title and file are required".into()));
        }
    };

    let new_video = NewVideo {
        title,
        description,
        file_name: file.file_name.clone(),
        content_type: file.content_type.clone(),
        size: file.size,
        uploader_id: identity.id().to_string(),
    };
    let video = match state.repo.record_video(&new_video).await {
        Ok(video) => video,
        Err(e) => {
            file.discard().await;
            return Err(e);
        }
    };
    tracing::info!(video_id = %video.id, size = video.size, "video uploaded");

    Ok((
        identity.headers(),
        Json(json!({
            "id": video.id,
            "title": video.title,
            "desc": video.description,
            "url": video.url,
        })),
    )
        .into_response())
}

/// GET /videos: newest first.
async fn list_videos(State(state): State<AppState>) -> AppResult<Response> {
    let videos = state.repo.list_videos().await?;
    Ok(Json(videos).into_response())
}
