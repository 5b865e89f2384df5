use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo};
use crate::features::auth::guards::RequireAdmin;
use crate::features::media::dtos::{
    parse_id, parse_label, MediaListQuery, MediaResponseDto, MediaUpload, UpdateMediaDto,
    UploadMediaDto,
};
use crate::features::media::services::MediaService;
use crate::shared::enums::{MediaCategory, MediaType};
use crate::shared::types::{ApiResponse, DeletedDto, Meta, PaginationQuery};

/// Read the upload form fields. Unknown fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<MediaUpload> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut media_type = MediaType::Foto;
    let mut media_category = MediaCategory::TamanUmum;
    let mut taman_kehati_id = None;
    let mut koleksi_tumbuhan_id = None;
    let mut caption = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;
            file = Some((data.to_vec(), file_name, content_type));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "media_type" => media_type = parse_label("media_type", &text)?,
            "media_category" => media_category = parse_label("media_category", &text)?,
            "taman_kehati_id" => taman_kehati_id = parse_id("taman_kehati_id", &text)?,
            "koleksi_tumbuhan_id" => koleksi_tumbuhan_id = parse_id("koleksi_tumbuhan_id", &text)?,
            "caption" => caption = Some(text).filter(|c| !c.trim().is_empty()),
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    let (data, file_name, content_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    Ok(MediaUpload {
        data,
        file_name,
        content_type,
        media_type,
        media_category,
        taman_kehati_id,
        koleksi_tumbuhan_id,
        caption,
    })
}

/// Upload a photo or video
///
/// Multipart form with `file` plus `media_type`, `media_category`,
/// `taman_kehati_id` and/or `koleksi_tumbuhan_id`, and an optional `caption`.
#[utoipa::path(
    post,
    path = "/api/media",
    request_body(content = UploadMediaDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media uploaded", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Missing file, wrong type or no garden/collection"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Collection not found"),
        (status = 502, description = "Object storage unavailable")
    ),
    tag = "media",
    security(("bearer_auth" = []))
)]
pub async fn upload_media(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<MediaService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaResponseDto>>)> {
    let upload = read_upload(multipart).await?;
    upload.validate()?;

    let media = service.upload(upload, &user, &client).await?;
    let url = service.public_url(&media);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(MediaResponseDto::new(media, url)),
            Some("Media uploaded successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/media",
    params(MediaListQuery, PaginationQuery),
    responses(
        (status = 200, description = "Media, main images first", body = ApiResponse<Vec<MediaResponseDto>>)
    ),
    tag = "media"
)]
pub async fn list_media(
    State(service): State<Arc<MediaService>>,
    Query(query): Query<MediaListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<MediaResponseDto>>>> {
    let (media, total) = service.list(&query, &pagination).await?;
    let dtos = media
        .into_iter()
        .map(|m| {
            let url = service.public_url(&m);
            MediaResponseDto::new(m, url)
        })
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

/// Media attached to a plant collection
#[utoipa::path(
    get,
    path = "/api/koleksi/{id}/media",
    params(("id" = i32, Path, description = "Koleksi ID"), PaginationQuery),
    responses(
        (status = 200, description = "Media of the collection, main image first", body = ApiResponse<Vec<MediaResponseDto>>),
        (status = 404, description = "Collection not found")
    ),
    tag = "koleksi"
)]
pub async fn list_koleksi_media(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<MediaResponseDto>>>> {
    let (media, total) = service.list_for_koleksi(id, &pagination).await?;
    let dtos = media
        .into_iter()
        .map(|m| {
            let url = service.public_url(&m);
            MediaResponseDto::new(m, url)
        })
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

#[utoipa::path(
    get,
    path = "/api/media/{id}",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media details", body = ApiResponse<MediaResponseDto>),
        (status = 404, description = "Media not found")
    ),
    tag = "media"
)]
pub async fn get_media(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MediaResponseDto>>> {
    let media = service.get(id).await?;
    let url = service.public_url(&media);
    Ok(Json(ApiResponse::success(
        Some(MediaResponseDto::new(media, url)),
        None,
        None,
    )))
}

/// Update caption or main-image flag
#[utoipa::path(
    patch,
    path = "/api/media/{id}",
    params(("id" = i32, Path, description = "Media ID")),
    request_body = UpdateMediaDto,
    responses(
        (status = 200, description = "Media updated", body = ApiResponse<MediaResponseDto>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Media not found")
    ),
    tag = "media",
    security(("bearer_auth" = []))
)]
pub async fn update_media(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateMediaDto>,
) -> Result<Json<ApiResponse<MediaResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let media = service.update(id, dto, &user, &client).await?;
    let url = service.public_url(&media);
    Ok(Json(ApiResponse::success(
        Some(MediaResponseDto::new(media, url)),
        Some("Media updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted", body = ApiResponse<DeletedDto>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Media not found")
    ),
    tag = "media",
    security(("bearer_auth" = []))
)]
pub async fn delete_media(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id, &user, &client).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto::new(id)),
        Some("Media deleted successfully".to_string()),
        None,
    )))
}
