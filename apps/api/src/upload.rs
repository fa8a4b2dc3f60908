//! Image upload storage and multipart form collection.
//!
//! Uploads land under `<media_dir>/profile/` with a random name and are
//! served back through the `/media` static route. Validation happens here,
//! so the HTTP body limit only has to be "large enough".

use std::collections::HashMap;

use anyhow::Context;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

/// Hard cap on a single uploaded image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Extracts and validates the file extension of an uploaded image name.
fn image_extension(original_name: &str) -> Result<String, AppError> {
    let ext = original_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && *ext != original_name)
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "'{original_name}' has no file extension; expected one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::UnsupportedMediaType(format!(
            "'.{ext}' images are not accepted; expected one of {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

/// Validates and stores one uploaded image, returning its public path
/// (`/media/profile/<name>`).
pub async fn save_image(
    media_dir: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = image_extension(original_name)?;

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "image is {} bytes; the limit is {MAX_UPLOAD_BYTES}",
            bytes.len()
        )));
    }

    let dir = std::path::Path::new(media_dir).join("profile");
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create media directory {}", dir.display()))?;

    let filename = format!("{}.{ext}", Uuid::new_v4().simple());
    tokio::fs::write(dir.join(&filename), bytes)
        .await
        .with_context(|| format!("failed to store upload {filename}"))?;

    Ok(format!("/media/profile/{filename}"))
}

/// Removes a stored image by its public `/media/...` path. Callers use this
/// to back out an upload whose surrounding database write failed, so a file
/// that is already gone is not an error.
pub async fn discard_image(media_dir: &str, public_path: &str) {
    let Some(relative) = public_path.strip_prefix("/media/") else {
        return;
    };
    let target = std::path::Path::new(media_dir).join(relative);
    if let Err(e) = tokio::fs::remove_file(&target).await {
        debug!("Could not remove {}: {e}", target.display());
    }
}

/// Multipart read failures are usually malformed bodies; the exception is
/// the HTTP body limit tripping mid-stream, which keeps its 413 status.
fn read_error(what: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("request body exceeds the upload limit".to_string())
    } else {
        AppError::Validation(format!("could not read {what}: {err}"))
    }
}

/// A multipart form drained into memory: text fields by name plus at most
/// one file part named `image` or `profile_image`.
pub struct UploadForm {
    fields: HashMap<String, String>,
    image: Option<(String, Bytes)>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| read_error("multipart body", e))?
        {
            // Field metadata has to be copied out before the body is read;
            // consuming the field invalidates it.
            let name = field.name().unwrap_or_default().to_string();
            if matches!(name.as_str(), "image" | "profile_image") {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| read_error(&format!("file part '{name}'"), e))?;
                image = Some((filename, bytes));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| read_error(&format!("form field '{name}'"), e))?;
                fields.insert(name, value);
            }
        }

        Ok(UploadForm { fields, image })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::Validation(format!("'{name}' is required")))
    }

    pub fn require_i32(&self, name: &str) -> Result<i32, AppError> {
        self.require(name)?
            .parse()
            .map_err(|_| AppError::Validation(format!("'{name}' must be an integer")))
    }

    pub fn get_i32(&self, name: &str) -> Result<Option<i32>, AppError> {
        self.get(name)
            .map(|v| {
                v.parse()
                    .map_err(|_| AppError::Validation(format!("'{name}' must be an integer")))
            })
            .transpose()
    }

    /// Boolean form field; absent stays `None`.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, AppError> {
        self.get(name)
            .map(|v| {
                parse_flag(v)
                    .ok_or_else(|| AppError::Validation(format!("'{name}' must be true or false")))
            })
            .transpose()
    }

    /// Stores the file part, if one was sent, and returns its public path.
    pub async fn store_image(&self, media_dir: &str) -> Result<Option<String>, AppError> {
        match &self.image {
            Some((filename, bytes)) => Ok(Some(save_image(media_dir, filename, bytes).await?)),
            None => Ok(None),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
