use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo, IfMatch, MaybeUser};
use crate::features::auth::guards::{RequireAdmin, RequireSuperAdmin};
use crate::features::gardens::dtos::{
    garden_geometry, masked_nearby, min_nearby_radius, CreateTamanKehatiDto, NearbyQuery,
    NearbyTamanDto, TamanKehatiListQuery, TamanKehatiResponseDto, TamanStatsDto,
    UpdateTamanKehatiDto,
};
use crate::features::gardens::services::GardenService;
use crate::shared::constants::{MAX_NEARBY_CANDIDATES, MAX_NEARBY_RESULTS};
use crate::shared::etag::{etag_header, generate_etag};
use crate::shared::geojson::FeatureCollection;
use crate::shared::types::{ApiResponse, DeletedDto, Meta, PaginationQuery};

type EtagHeader = [(HeaderName, HeaderValue); 1];

/// List Taman Kehati
#[utoipa::path(
    get,
    path = "/api/taman-kehati",
    params(TamanKehatiListQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated gardens, coordinates masked for non-admins", body = ApiResponse<Vec<TamanKehatiResponseDto>>)
    ),
    tag = "taman-kehati"
)]
pub async fn list_taman(
    caller: MaybeUser,
    State(service): State<Arc<GardenService>>,
    Query(query): Query<TamanKehatiListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<TamanKehatiResponseDto>>>> {
    let (gardens, total) = service.list(&query, &pagination).await?;
    let dtos = gardens
        .into_iter()
        .map(|t| TamanKehatiResponseDto::masked(t, service.masking(), caller.role()))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

/// Get a Taman Kehati
///
/// The `ETag` header can be sent back as `If-Match` on update/delete.
#[utoipa::path(
    get,
    path = "/api/taman-kehati/{id}",
    params(("id" = i32, Path, description = "Taman Kehati ID")),
    responses(
        (status = 200, description = "Garden details", body = ApiResponse<TamanKehatiResponseDto>,
         headers(("ETag" = String, description = "Resource fingerprint"))),
        (status = 404, description = "Garden not found")
    ),
    tag = "taman-kehati"
)]
pub async fn get_taman(
    caller: MaybeUser,
    State(service): State<Arc<GardenService>>,
    Path(id): Path<i32>,
) -> Result<(EtagHeader, Json<ApiResponse<TamanKehatiResponseDto>>)> {
    let taman = service.get(id).await?;
    let etag = generate_etag(&taman);
    let dto = TamanKehatiResponseDto::masked(taman, service.masking(), caller.role());
    Ok((etag_header(&etag), Json(ApiResponse::success(Some(dto), None, None))))
}

/// Garden centre point and boundary as a GeoJSON FeatureCollection
#[utoipa::path(
    get,
    path = "/api/taman-kehati/{id}/geo",
    params(("id" = i32, Path, description = "Taman Kehati ID")),
    responses(
        (status = 200, description = "GeoJSON FeatureCollection", body = ApiResponse<FeatureCollection>),
        (status = 404, description = "Garden not found")
    ),
    tag = "taman-kehati"
)]
pub async fn get_taman_geo(
    caller: MaybeUser,
    State(service): State<Arc<GardenService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<FeatureCollection>>> {
    let taman = service.get(id).await?;
    let geo = garden_geometry(&taman, service.masking(), caller.role());
    Ok(Json(ApiResponse::success(Some(geo), None, None)))
}

/// Collection, article and page view counts for a garden
#[utoipa::path(
    get,
    path = "/api/taman-kehati/{id}/stats",
    params(("id" = i32, Path, description = "Taman Kehati ID")),
    responses(
        (status = 200, description = "Garden statistics", body = ApiResponse<TamanStatsDto>),
        (status = 404, description = "Garden not found")
    ),
    tag = "taman-kehati"
)]
pub async fn get_taman_stats(
    State(service): State<Arc<GardenService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TamanStatsDto>>> {
    let stats = service.stats(id).await?;
    Ok(Json(ApiResponse::success(Some(stats.into()), None, None)))
}

/// Find gardens near a point
#[utoipa::path(
    get,
    path = "/api/taman-kehati/near",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Up to 20 gardens, nearest first", body = ApiResponse<Vec<NearbyTamanDto>>),
        (status = 400, description = "Invalid coordinates, or radius below the 1 km floor for non-admins")
    ),
    tag = "taman-kehati"
)]
pub async fn near_taman(
    caller: MaybeUser,
    State(service): State<Arc<GardenService>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyTamanDto>>>> {
    let role = caller.role();

    let dtos: Vec<NearbyTamanDto> = if role.is_some_and(|r| r.is_admin()) {
        let radius = query.radius(0.0)?;
        service
            .near(query.lat, query.lng, radius, MAX_NEARBY_RESULTS)
            .await?
            .into_iter()
            .map(|n| NearbyTamanDto {
                distance_m: Some(n.distance_m),
                taman: TamanKehatiResponseDto::masked(n.taman, service.masking(), role),
            })
            .collect()
    } else {
        let profile = service.masking().profile_for_caller(role);
        let radius = query.radius(min_nearby_radius(profile))?;
        // Widen the stored-point search so every garden whose masked point
        // falls inside the radius is a candidate
        let candidates = service
            .near(
                query.lat,
                query.lng,
                radius + profile.max_displacement_meters(),
                MAX_NEARBY_CANDIDATES,
            )
            .await?;
        masked_nearby(query.origin(), radius, candidates, service.masking(), role)
    };

    let total = dtos.len() as i64;
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}

/// Create a Taman Kehati (super admin only)
#[utoipa::path(
    post,
    path = "/api/taman-kehati",
    request_body = CreateTamanKehatiDto,
    responses(
        (status = 201, description = "Garden created", body = ApiResponse<TamanKehatiResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Super admin access required"),
        (status = 409, description = "Kode already exists")
    ),
    tag = "taman-kehati",
    security(("bearer_auth" = []))
)]
pub async fn create_taman(
    RequireSuperAdmin(user): RequireSuperAdmin,
    client: ClientInfo,
    State(service): State<Arc<GardenService>>,
    AppJson(dto): AppJson<CreateTamanKehatiDto>,
) -> Result<(StatusCode, EtagHeader, Json<ApiResponse<TamanKehatiResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let taman = service.create(dto, &user, &client).await?;
    let etag = generate_etag(&taman);
    let dto = TamanKehatiResponseDto::masked(taman, service.masking(), Some(user.role));
    Ok((
        StatusCode::CREATED,
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(dto),
            Some("Taman Kehati created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a Taman Kehati
///
/// `admin_taman` accounts may only update their own garden. Send the `ETag` from
/// a previous read as `If-Match` to reject the write when someone else changed it first.
#[utoipa::path(
    put,
    path = "/api/taman-kehati/{id}",
    params(
        ("id" = i32, Path, description = "Taman Kehati ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    request_body = UpdateTamanKehatiDto,
    responses(
        (status = 200, description = "Garden updated", body = ApiResponse<TamanKehatiResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No access to this garden"),
        (status = 404, description = "Garden not found"),
        (status = 412, description = "Garden was modified since it was read")
    ),
    tag = "taman-kehati",
    security(("bearer_auth" = []))
)]
pub async fn update_taman(
    RequireAdmin(user): RequireAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<GardenService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateTamanKehatiDto>,
) -> Result<(EtagHeader, Json<ApiResponse<TamanKehatiResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let taman = service
        .update(id, dto, if_match.as_deref(), &user, &client)
        .await?;
    let etag = generate_etag(&taman);
    let dto = TamanKehatiResponseDto::masked(taman, service.masking(), Some(user.role));
    Ok((
        etag_header(&etag),
        Json(ApiResponse::success(
            Some(dto),
            Some("Taman Kehati updated successfully".to_string()),
            None,
        )),
    ))
}

/// Delete a Taman Kehati (super admin only)
#[utoipa::path(
    delete,
    path = "/api/taman-kehati/{id}",
    params(
        ("id" = i32, Path, description = "Taman Kehati ID"),
        ("If-Match" = Option<String>, Header, description = "ETag from a previous read")
    ),
    responses(
        (status = 200, description = "Garden deleted", body = ApiResponse<DeletedDto>),
        (status = 404, description = "Garden not found"),
        (status = 409, description = "Garden still has collections, zones or media"),
        (status = 412, description = "Garden was modified since it was read")
    ),
    tag = "taman-kehati",
    security(("bearer_auth" = []))
)]
pub async fn delete_taman(
    RequireSuperAdmin(user): RequireSuperAdmin,
    if_match: IfMatch,
    client: ClientInfo,
    State(service): State<Arc<GardenService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service
        .delete(id, if_match.as_deref(), &user, &client)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto::new(id)),
        Some("Taman Kehati deleted successfully".to_string()),
        None,
    )))
}
