use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo, IfMatch, MaybeUser};
use crate::features::articles::dtos::{
    ArtikelListQuery, CreateArtikelDto, RelatedQuery, SetCoverDto, UpdateArtikelDto,
};
use crate::features::articles::models::Artikel;
use crate::features::articles::services::ArticleService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::etag::{etag_header, generate_etag};
use crate::shared::types::{ApiResponse, DeletedDto, Meta, PaginationQuery};

type EtagHeader = [(HeaderName, HeaderValue); 1];

fn is_admin(caller: &MaybeUser) -> bool {
    caller.role().is_some_and(|r| r.is_admin())
}

/// Unpublished articles are visible to admins only
fn ensure_visible(artikel: &Artikel, caller: &MaybeUser) -> Result<()> {
    if artikel.is_published() || is_admin(caller) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Artikel is not published".to_string()))
    }
}

fn with_etag(artikel: Artikel, message: Option<&str>) -> (EtagHeader, Json<ApiResponse<Artikel>>) {
    let etag = generate_etag(&artikel);
    (
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(artikel),
            message.map(str::to_string),
            None,
        )),
    )
}

/// List articles, newest publication first
///
/// Non-admin callers only receive published articles.
#[utoipa::path(
    get,
    path = "/api/artikel",
    params(ArtikelListQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated articles", body = ApiResponse<Vec<Artikel>>),
        (status = 403, description = "Non-admin asked for unpublished articles")
    ),
    tag = "artikel"
)]
pub async fn list_artikel(
    caller: MaybeUser,
    State(service): State<Arc<ArticleService>>,
    Query(query): Query<ArtikelListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<Artikel>>>> {
    let status = query.effective_status(is_admin(&caller))?;
    let (articles, total) = service.list(&query, status, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(articles),
        None,
        Meta::total(total),
    )))
}

#[utoipa::path(
    get,
    path = "/api/artikel/{id}",
    params(("id" = i32, Path, description = "Artikel ID")),
    responses(
        (status = 200, description = "Article", body = ApiResponse<Artikel>,
         headers(("ETag" = String, description = "Resource fingerprint"))),
        (status = 403, description = "Article is not published"),
        (status = 404, description = "Article not found")
    ),
    tag = "artikel"
)]
pub async fn get_artikel(
    caller: MaybeUser,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
) -> Result<(EtagHeader, Json<ApiResponse<Artikel>>)> {
    let artikel = service.get(id).await?;
    ensure_visible(&artikel, &caller)?;
    Ok(with_etag(artikel, None))
}

#[utoipa::path(
    get,
    path = "/api/artikel/slug/{slug}",
    params(("slug" = String, Path, description = "Artikel slug")),
    responses(
        (status = 200, description = "Article", body = ApiResponse<Artikel>,
         headers(("ETag" = String, description = "Resource fingerprint"))),
        (status = 403, description = "Article is not published"),
        (status = 404, description = "Article not found")
    ),
    tag = "artikel"
)]
pub async fn get_artikel_by_slug(
    caller: MaybeUser,
    State(service): State<Arc<ArticleService>>,
    Path(slug): Path<String>,
) -> Result<(EtagHeader, Json<ApiResponse<Artikel>>)> {
    let artikel = service.get_by_slug(&slug).await?;
    ensure_visible(&artikel, &caller)?;
    Ok(with_etag(artikel, None))
}

/// Published articles sharing the garden, author or category
#[utoipa::path(
    get,
    path = "/api/artikel/{id}/related",
    params(("id" = i32, Path, description = "Artikel ID"), RelatedQuery),
    responses(
        (status = 200, description = "Related articles", body = ApiResponse<Vec<Artikel>>),
        (status = 404, description = "Article not found")
    ),
    tag = "artikel"
)]
pub async fn related_artikel(
    caller: MaybeUser,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<ApiResponse<Vec<Artikel>>>> {
    let artikel = service.get(id).await?;
    ensure_visible(&artikel, &caller)?;

    let related = service.related(&artikel, query.limit()).await?;
    let total = related.len() as i64;
    Ok(Json(ApiResponse::success(Some(related), None, Meta::total(total))))
}

#[utoipa::path(
    post,
    path = "/api/artikel",
    request_body = CreateArtikelDto,
    responses(
        (status = 201, description = "Article created with a unique slug", body = ApiResponse<Artikel>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden")
    ),
    tag = "artikel",
    security(("bearer_auth" = []))
)]
pub async fn create_artikel(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<ArticleService>>,
    AppJson(dto): AppJson<CreateArtikelDto>,
) -> Result<(StatusCode, EtagHeader, Json<ApiResponse<Artikel>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let artikel = service.create(dto, &user, &client).await?;
    let (etag, body) = with_etag(artikel, Some("Artikel created successfully"));
    Ok((StatusCode::CREATED, etag, body))
}

#[utoipa::path(
    put,
    path = "/api/artikel/{id}",
    params(
        ("id" = i32, Path, description = "Artikel ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    request_body = UpdateArtikelDto,
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<Artikel>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Article not found"),
        (status = 412, description = "Article was modified since it was read")
    ),
    tag = "artikel",
    security(("bearer_auth" = []))
)]
pub async fn update_artikel(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateArtikelDto>,
) -> Result<(EtagHeader, Json<ApiResponse<Artikel>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let artikel = service
        .update(id, dto, if_match.as_deref(), &user, &client)
        .await?;
    Ok(with_etag(artikel, Some("Artikel updated successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/artikel/{id}/publish",
    params(
        ("id" = i32, Path, description = "Artikel ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    responses(
        (status = 200, description = "Article published", body = ApiResponse<Artikel>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Article not found"),
        (status = 412, description = "Article was modified since it was read")
    ),
    tag = "artikel",
    security(("bearer_auth" = []))
)]
pub async fn publish_artikel(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
) -> Result<(EtagHeader, Json<ApiResponse<Artikel>>)> {
    let artikel = service
        .publish(id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(with_etag(artikel, Some("Artikel published successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/artikel/{id}/cover",
    params(
        ("id" = i32, Path, description = "Artikel ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    request_body = SetCoverDto,
    responses(
        (status = 200, description = "Cover image set", body = ApiResponse<Artikel>),
        (status = 400, description = "Media does not exist"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Article not found"),
        (status = 412, description = "Article was modified since it was read")
    ),
    tag = "artikel",
    security(("bearer_auth" = []))
)]
pub async fn set_artikel_cover(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<SetCoverDto>,
) -> Result<(EtagHeader, Json<ApiResponse<Artikel>>)> {
    let artikel = service
        .set_cover(id, dto.cover_image_id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(with_etag(artikel, Some("Cover image updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/artikel/{id}",
    params(
        ("id" = i32, Path, description = "Artikel ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    responses(
        (status = 200, description = "Article deleted", body = ApiResponse<DeletedDto>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Article not found"),
        (status = 412, description = "Article was modified since it was read")
    ),
    tag = "artikel",
    security(("bearer_auth" = []))
)]
pub async fn delete_artikel(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service
        .delete(id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto::new(id)),
        Some("Artikel deleted successfully".to_string()),
        None,
    )))
}
