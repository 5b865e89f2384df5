use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo, IfMatch, MaybeUser};
use crate::features::auth::guards::RequireAdmin;
use crate::features::collections::dtos::{
    CreateKoleksiDto, KoleksiListQuery, KoleksiMapPointDto, KoleksiRelationsDto,
    KoleksiResponseDto, KoleksiStatsDto, MapPointsQuery, StatsGroupDto, StatsQuery, SuggestQuery,
    UpdateKoleksiDto, ZonaKoleksiQuery,
};
use crate::features::collections::services::CollectionService;
use crate::shared::etag::{etag_header, generate_etag};
use crate::shared::types::{ApiResponse, DeletedDto, Meta, PaginationQuery};

type EtagHeader = [(HeaderName, HeaderValue); 1];

/// List plant collections
#[utoipa::path(
    get,
    path = "/api/koleksi",
    params(KoleksiListQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated collections, coordinates masked for non-admins", body = ApiResponse<Vec<KoleksiResponseDto>>),
        (status = 400, description = "Unknown sort column")
    ),
    tag = "koleksi"
)]
pub async fn list_koleksi(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<KoleksiListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<KoleksiResponseDto>>>> {
    let (rows, total) = service.list(&query, &pagination).await?;
    let dtos = rows
        .into_iter()
        .map(|k| KoleksiResponseDto::masked(k, service.masking(), caller.role()))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

#[utoipa::path(
    get,
    path = "/api/koleksi/{id}",
    params(("id" = i32, Path, description = "Koleksi ID")),
    responses(
        (status = 200, description = "Collection details", body = ApiResponse<KoleksiResponseDto>,
         headers(("ETag" = String, description = "Resource fingerprint"))),
        (status = 404, description = "Collection not found")
    ),
    tag = "koleksi"
)]
pub async fn get_koleksi(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i32>,
) -> Result<(EtagHeader, Json<ApiResponse<KoleksiResponseDto>>)> {
    let koleksi = service.get(id).await?;
    let etag = generate_etag(&koleksi);
    let dto = KoleksiResponseDto::masked(koleksi, service.masking(), caller.role());
    Ok((etag_header(&etag), Json(ApiResponse::success(Some(dto), None, None))))
}

/// Collections planted in a zone
#[utoipa::path(
    get,
    path = "/api/zona/{id}/koleksi",
    params(("id" = i32, Path, description = "Zona ID"), ZonaKoleksiQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated collections of the zone, coordinates masked for non-admins", body = ApiResponse<Vec<KoleksiResponseDto>>),
        (status = 404, description = "Zone not found")
    ),
    tag = "zona"
)]
pub async fn list_zona_koleksi(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i32>,
    Query(query): Query<ZonaKoleksiQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<KoleksiResponseDto>>>> {
    let (rows, total) = service.list_in_zona(id, &query, &pagination).await?;
    let dtos = rows
        .into_iter()
        .map(|k| KoleksiResponseDto::masked(k, service.masking(), caller.role()))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

/// Related collections and articles
#[utoipa::path(
    get,
    path = "/api/koleksi/{id}/relations",
    params(("id" = i32, Path, description = "Koleksi ID")),
    responses(
        (status = 200, description = "Up to five of each, coordinates masked for non-admins", body = ApiResponse<KoleksiRelationsDto>),
        (status = 404, description = "Collection not found")
    ),
    tag = "koleksi"
)]
pub async fn koleksi_relations(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<KoleksiRelationsDto>>> {
    let koleksi = service.get(id).await?;
    let (terkait, artikel) = service.relations(&koleksi).await?;
    let dto = KoleksiRelationsDto::masked(terkait, artikel, service.masking(), caller.role());
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Scientific name autocomplete
///
/// Queries shorter than two characters return an empty list.
#[utoipa::path(
    get,
    path = "/api/koleksi/suggest",
    params(SuggestQuery),
    responses(
        (status = 200, description = "Up to ten distinct scientific names", body = ApiResponse<Vec<String>>)
    ),
    tag = "koleksi"
)]
pub async fn suggest_koleksi(
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let names = service.suggest(&query.q).await?;
    Ok(Json(ApiResponse::success(Some(names), None, None)))
}

/// Collection counts grouped by endemic status, genus or garden
#[utoipa::path(
    get,
    path = "/api/koleksi/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Grouped counts", body = ApiResponse<KoleksiStatsDto>),
        (status = 400, description = "Unknown group_by")
    ),
    tag = "koleksi"
)]
pub async fn koleksi_stats(
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<KoleksiStatsDto>>> {
    let rows = service.stats(query.group_by).await?;
    let results = rows
        .into_iter()
        .map(|row| StatsGroupDto {
            group_value: row.group_value.unwrap_or_else(|| "null".to_string()),
            count: row.count,
        })
        .collect();

    Ok(Json(ApiResponse::success(
        Some(KoleksiStatsDto {
            group_by: query.group_by,
            results,
        }),
        None,
        None,
    )))
}

/// Collection points for map rendering
#[utoipa::path(
    get,
    path = "/api/koleksi/map",
    params(MapPointsQuery),
    responses(
        (status = 200, description = "Points, masked for non-admins", body = ApiResponse<Vec<KoleksiMapPointDto>>)
    ),
    tag = "koleksi"
)]
pub async fn koleksi_map_points(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<MapPointsQuery>,
) -> Result<Json<ApiResponse<Vec<KoleksiMapPointDto>>>> {
    let points = service.map_points(&query).await?;
    let total = points.len() as i64;
    let dtos = points
        .into_iter()
        .map(|p| KoleksiMapPointDto::masked(p, service.masking(), caller.role()))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

#[utoipa::path(
    post,
    path = "/api/koleksi",
    request_body = CreateKoleksiDto,
    responses(
        (status = 201, description = "Collection created", body = ApiResponse<KoleksiResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 409, description = "Nomor koleksi already exists")
    ),
    tag = "koleksi",
    security(("bearer_auth" = []))
)]
pub async fn create_koleksi(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<CollectionService>>,
    AppJson(dto): AppJson<CreateKoleksiDto>,
) -> Result<(StatusCode, EtagHeader, Json<ApiResponse<KoleksiResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let koleksi = service.create(dto, &user, &client).await?;
    let etag = generate_etag(&koleksi);
    let dto = KoleksiResponseDto::masked(koleksi, service.masking(), Some(user.role));
    Ok((
        StatusCode::CREATED,
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(dto),
            Some("Koleksi created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/koleksi/{id}",
    params(
        ("id" = i32, Path, description = "Koleksi ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    request_body = UpdateKoleksiDto,
    responses(
        (status = 200, description = "Collection updated", body = ApiResponse<KoleksiResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Collection not found"),
        (status = 412, description = "Collection was modified since it was read")
    ),
    tag = "koleksi",
    security(("bearer_auth" = []))
)]
pub async fn update_koleksi(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateKoleksiDto>,
) -> Result<(EtagHeader, Json<ApiResponse<KoleksiResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let koleksi = service
        .update(id, dto, if_match.as_deref(), &user, &client)
        .await?;
    let etag = generate_etag(&koleksi);
    let dto = KoleksiResponseDto::masked(koleksi, service.masking(), Some(user.role));
    Ok((
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(dto),
            Some("Koleksi updated successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/koleksi/{id}",
    params(
        ("id" = i32, Path, description = "Koleksi ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    responses(
        (status = 200, description = "Collection deleted", body = ApiResponse<DeletedDto>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Collection not found"),
        (status = 412, description = "Collection was modified since it was read")
    ),
    tag = "koleksi",
    security(("bearer_auth" = []))
)]
pub async fn delete_koleksi(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<CollectionService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service
        .delete(id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto::new(id)),
        Some("Koleksi deleted successfully".to_string()),
        None,
    )))
}
