use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo, IfMatch};
use crate::features::auth::guards::RequireAdmin;
use crate::features::zones::dtos::{
    zones_from_geojson, CreateZonaDto, ImportZonaQuery, UpdateZonaDto, ZonaListQuery,
    ZonaResponseDto,
};
use crate::features::zones::services::ZoneService;
use crate::shared::etag::{etag_header, generate_etag};
use crate::shared::geojson::Feature;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

type EtagHeader = [(HeaderName, HeaderValue); 1];

/// List zones, optionally of one garden
#[utoipa::path(
    get,
    path = "/api/zona",
    params(ZonaListQuery),
    responses(
        (status = 200, description = "Zones", body = ApiResponse<Vec<ZonaResponseDto>>)
    ),
    tag = "zona"
)]
pub async fn list_zona(
    State(service): State<Arc<ZoneService>>,
    Query(query): Query<ZonaListQuery>,
) -> Result<Json<ApiResponse<Vec<ZonaResponseDto>>>> {
    let zones = service.list(query.taman_kehati_id).await?;
    let total = zones.len() as i64;
    let dtos = zones.into_iter().map(ZonaResponseDto::from).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

#[utoipa::path(
    get,
    path = "/api/zona/{id}",
    params(("id" = i32, Path, description = "Zona ID")),
    responses(
        (status = 200, description = "Zone details", body = ApiResponse<ZonaResponseDto>,
         headers(("ETag" = String, description = "Resource fingerprint"))),
        (status = 404, description = "Zone not found")
    ),
    tag = "zona"
)]
pub async fn get_zona(
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<i32>,
) -> Result<(EtagHeader, Json<ApiResponse<ZonaResponseDto>>)> {
    let zona = service.get(id).await?;
    let etag = generate_etag(&zona);
    Ok((
        etag_header(&etag),
        Json(ApiResponse::success(Some(zona.into()), None, None)),
    ))
}

/// Zone polygon as a GeoJSON Feature
#[utoipa::path(
    get,
    path = "/api/zona/{id}/geo",
    params(("id" = i32, Path, description = "Zona ID")),
    responses(
        (status = 200, description = "GeoJSON Feature", body = ApiResponse<Feature>),
        (status = 404, description = "Zone or zone polygon not found")
    ),
    tag = "zona"
)]
pub async fn get_zona_geo(
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Feature>>> {
    let zona = service.get(id).await?;
    let feature = zona
        .to_feature()
        .ok_or_else(|| AppError::NotFound(format!("Zona {} has no polygon", id)))?;
    Ok(Json(ApiResponse::success(Some(feature), None, None)))
}

/// Import zones from GeoJSON
///
/// The body is a Polygon, MultiPolygon, Feature or FeatureCollection. Every
/// feature becomes one zone; the import is all-or-nothing.
#[utoipa::path(
    post,
    path = "/api/zona/import",
    params(ImportZonaQuery),
    request_body(content = serde_json::Value, description = "GeoJSON Polygon, MultiPolygon, Feature or FeatureCollection"),
    responses(
        (status = 201, description = "Zones created", body = ApiResponse<Vec<ZonaResponseDto>>),
        (status = 400, description = "Invalid GeoJSON or zone properties"),
        (status = 403, description = "No access to this garden"),
        (status = 409, description = "Kode zona already exists")
    ),
    tag = "zona",
    security(("bearer_auth" = []))
)]
pub async fn import_zona(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<ZoneService>>,
    Query(query): Query<ImportZonaQuery>,
    AppJson(geojson): AppJson<serde_json::Value>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ZonaResponseDto>>>)> {
    user.ensure_taman_access(query.taman_kehati_id)?;
    let zones = zones_from_geojson(query.taman_kehati_id, &geojson)?;

    let created = service
        .import(query.taman_kehati_id, zones, &user, &client)
        .await?;
    let total = created.len() as i64;
    let message = format!("Imported {} zones", total);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(created.into_iter().map(Into::into).collect()),
            Some(message),
            Meta::total(total),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/zona",
    request_body = CreateZonaDto,
    responses(
        (status = 201, description = "Zone created", body = ApiResponse<ZonaResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 409, description = "Kode zona already exists")
    ),
    tag = "zona",
    security(("bearer_auth" = []))
)]
pub async fn create_zona(
    RequireAdmin(user): RequireAdmin,
    client: ClientInfo,
    State(service): State<Arc<ZoneService>>,
    AppJson(dto): AppJson<CreateZonaDto>,
) -> Result<(StatusCode, EtagHeader, Json<ApiResponse<ZonaResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let zona = service.create(dto, &user, &client).await?;
    let etag = generate_etag(&zona);
    Ok((
        StatusCode::CREATED,
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(zona.into()),
            Some("Zona created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/zona/{id}",
    params(
        ("id" = i32, Path, description = "Zona ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    request_body = UpdateZonaDto,
    responses(
        (status = 200, description = "Zone updated", body = ApiResponse<ZonaResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Zone not found"),
        (status = 412, description = "Zone was modified since it was read")
    ),
    tag = "zona",
    security(("bearer_auth" = []))
)]
pub async fn update_zona(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateZonaDto>,
) -> Result<(EtagHeader, Json<ApiResponse<ZonaResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let zona = service
        .update(id, dto, if_match.as_deref(), &user, &client)
        .await?;
    let etag = generate_etag(&zona);
    Ok((
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(zona.into()),
            Some("Zona updated successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/zona/{id}",
    params(
        ("id" = i32, Path, description = "Zona ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    responses(
        (status = 200, description = "Zone deleted", body = ApiResponse<DeletedDto>),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Zone not found"),
        (status = 409, description = "Zone still has collections"),
        (status = 412, description = "Zone was modified since it was read")
    ),
    tag = "zona",
    security(("bearer_auth" = []))
)]
pub async fn delete_zona(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<ZoneService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service
        .delete(id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto::new(id)),
        Some("Zona deleted successfully".to_string()),
        None,
    )))
}
