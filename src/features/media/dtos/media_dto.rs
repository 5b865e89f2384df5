use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::media::models::Media;
use crate::shared::constants::{
    ALLOWED_IMAGE_TYPES, ALLOWED_VIDEO_TYPES, MAX_IMAGE_BYTES, MAX_VIDEO_BYTES,
};
use crate::shared::enums::{MediaCategory, MediaType};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MediaListQuery {
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    pub media_type: Option<MediaType>,
    pub is_main_image: Option<bool>,
}

/// Multipart upload form, documented for Swagger UI only.
/// The handler reads the fields from `Multipart` directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// `foto` (default) or `video`
    #[schema(example = "foto")]
    pub media_type: Option<String>,
    #[schema(example = "bunga")]
    pub media_category: Option<String>,
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    pub caption: Option<String>,
}

/// Upload after the multipart body has been read
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub media_type: MediaType,
    pub media_category: MediaCategory,
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    pub caption: Option<String>,
}

fn allowed_types(media_type: MediaType) -> &'static [&'static str] {
    match media_type {
        MediaType::Foto => ALLOWED_IMAGE_TYPES,
        MediaType::Video => ALLOWED_VIDEO_TYPES,
    }
}

fn max_bytes(media_type: MediaType) -> usize {
    match media_type {
        MediaType::Foto => MAX_IMAGE_BYTES,
        MediaType::Video => MAX_VIDEO_BYTES,
    }
}

impl MediaUpload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.taman_kehati_id.is_none() && self.koleksi_tumbuhan_id.is_none() {
            return Err(AppError::BadRequest(
                "Either taman_kehati_id or koleksi_tumbuhan_id must be provided".to_string(),
            ));
        }

        if self.data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let limit = max_bytes(self.media_type);
        if self.data.len() > limit {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size for {} is {} MB",
                self.media_type.folder(),
                limit / 1024 / 1024
            )));
        }

        let allowed = allowed_types(self.media_type);
        if !allowed.contains(&self.content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid file type for {}: {}. Allowed types: {}",
                self.media_type.folder(),
                self.content_type,
                allowed.join(", ")
            )));
        }

        Ok(())
    }
}

/// Parse an enum form field using its JSON label
pub fn parse_label<T: serde::de::DeserializeOwned>(field: &str, value: &str) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_string()))
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))
}

pub fn parse_id(field: &str, value: &str) -> Result<Option<i32>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMediaDto {
    #[validate(length(max = 2000, message = "Caption must be at most 2000 characters"))]
    pub caption: Option<String>,
    /// Setting `true` clears the flag on the other media of the same collection or garden
    pub is_main_image: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponseDto {
    pub id: i32,
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    pub media_type: MediaType,
    pub media_category: MediaCategory,
    pub file_name: String,
    pub file_path: String,
    /// Public URL of the stored object
    pub url: String,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub is_main_image: bool,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MediaResponseDto {
    pub fn new(media: Media, url: String) -> Self {
        Self {
            id: media.id,
            taman_kehati_id: media.taman_kehati_id,
            koleksi_tumbuhan_id: media.koleksi_tumbuhan_id,
            media_type: media.media_type,
            media_category: media.media_category,
            file_name: media.file_name,
            file_path: media.file_path,
            url,
            file_size: media.file_size,
            mime_type: media.mime_type,
            caption: media.caption,
            is_main_image: media.is_main_image,
            uploaded_by: media.uploaded_by,
            created_at: media.created_at,
        }
    }
}
