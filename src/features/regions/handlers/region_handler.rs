use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::regions::dtos::{RegionResponseDto, RegionSearchQuery};
use crate::features::regions::models::{Region, RegionLevel};
use crate::features::regions::services::RegionService;
use crate::shared::types::ApiResponse;

fn to_dtos(regions: Vec<Region>, level: RegionLevel) -> Vec<RegionResponseDto> {
    regions
        .into_iter()
        .map(|r| RegionResponseDto::from_region(r, level))
        .collect()
}

/// List all provinces
#[utoipa::path(
    get,
    path = "/api/regions/provinsi",
    params(RegionSearchQuery),
    responses(
        (status = 200, description = "List of provinces", body = ApiResponse<Vec<RegionResponseDto>>)
    ),
    tag = "regions"
)]
pub async fn list_provinsi(
    State(service): State<Arc<RegionService>>,
    Query(query): Query<RegionSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let regions = service.list_provinsi(query.search.as_deref()).await?;
    Ok(Json(ApiResponse::success(
        Some(to_dtos(regions, RegionLevel::Provinsi)),
        None,
        None,
    )))
}

/// Get a province by code
#[utoipa::path(
    get,
    path = "/api/regions/provinsi/{kode}",
    params(
        ("kode" = String, Path, description = "Provinsi code")
    ),
    responses(
        (status = 200, description = "Provinsi details", body = ApiResponse<RegionResponseDto>),
        (status = 404, description = "Provinsi not found")
    ),
    tag = "regions"
)]
pub async fn get_provinsi(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    let region = service.get_by_code(RegionLevel::Provinsi, &kode).await?;
    Ok(Json(ApiResponse::success(
        Some(RegionResponseDto::from_region(region, RegionLevel::Provinsi)),
        None,
        None,
    )))
}

/// List regency/city entries within a province
#[utoipa::path(
    get,
    path = "/api/regions/provinsi/{kode}/kabupaten-kota",
    params(
        ("kode" = String, Path, description = "Provinsi code"),
        RegionSearchQuery
    ),
    responses(
        (status = 200, description = "Kabupaten/Kota list", body = ApiResponse<Vec<RegionResponseDto>>),
        (status = 404, description = "Provinsi not found")
    ),
    tag = "regions"
)]
pub async fn list_kabupaten_kota(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
    Query(query): Query<RegionSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let regions = service
        .list_children(RegionLevel::Provinsi, &kode, query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(to_dtos(regions, RegionLevel::KabupatenKota)),
        None,
        None,
    )))
}

/// Get a regency/city by code
#[utoipa::path(
    get,
    path = "/api/regions/kabupaten-kota/{kode}",
    params(
        ("kode" = String, Path, description = "Kabupaten/Kota code")
    ),
    responses(
        (status = 200, description = "Kabupaten/Kota details", body = ApiResponse<RegionResponseDto>),
        (status = 404, description = "Kabupaten/Kota not found")
    ),
    tag = "regions"
)]
pub async fn get_kabupaten_kota(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    let region = service.get_by_code(RegionLevel::KabupatenKota, &kode).await?;
    Ok(Json(ApiResponse::success(
        Some(RegionResponseDto::from_region(region, RegionLevel::KabupatenKota)),
        None,
        None,
    )))
}

/// List district entries within a regency/city
#[utoipa::path(
    get,
    path = "/api/regions/kabupaten-kota/{kode}/kecamatan",
    params(
        ("kode" = String, Path, description = "Kabupaten/Kota code"),
        RegionSearchQuery
    ),
    responses(
        (status = 200, description = "Kecamatan list", body = ApiResponse<Vec<RegionResponseDto>>),
        (status = 404, description = "Kabupaten/Kota not found")
    ),
    tag = "regions"
)]
pub async fn list_kecamatan(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
    Query(query): Query<RegionSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let regions = service
        .list_children(RegionLevel::KabupatenKota, &kode, query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(to_dtos(regions, RegionLevel::Kecamatan)),
        None,
        None,
    )))
}

/// Get a district by code
#[utoipa::path(
    get,
    path = "/api/regions/kecamatan/{kode}",
    params(
        ("kode" = String, Path, description = "Kecamatan code")
    ),
    responses(
        (status = 200, description = "Kecamatan details", body = ApiResponse<RegionResponseDto>),
        (status = 404, description = "Kecamatan not found")
    ),
    tag = "regions"
)]
pub async fn get_kecamatan(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    let region = service.get_by_code(RegionLevel::Kecamatan, &kode).await?;
    Ok(Json(ApiResponse::success(
        Some(RegionResponseDto::from_region(region, RegionLevel::Kecamatan)),
        None,
        None,
    )))
}

/// List village entries within a district
#[utoipa::path(
    get,
    path = "/api/regions/kecamatan/{kode}/desa",
    params(
        ("kode" = String, Path, description = "Kecamatan code"),
        RegionSearchQuery
    ),
    responses(
        (status = 200, description = "Desa list", body = ApiResponse<Vec<RegionResponseDto>>),
        (status = 404, description = "Kecamatan not found")
    ),
    tag = "regions"
)]
pub async fn list_desa(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
    Query(query): Query<RegionSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RegionResponseDto>>>> {
    let regions = service
        .list_children(RegionLevel::Kecamatan, &kode, query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(to_dtos(regions, RegionLevel::Desa)),
        None,
        None,
    )))
}

/// Get a village by code
#[utoipa::path(
    get,
    path = "/api/regions/desa/{kode}",
    params(
        ("kode" = String, Path, description = "Desa code")
    ),
    responses(
        (status = 200, description = "Desa details", body = ApiResponse<RegionResponseDto>),
        (status = 404, description = "Desa not found")
    ),
    tag = "regions"
)]
pub async fn get_desa(
    State(service): State<Arc<RegionService>>,
    Path(kode): Path<String>,
) -> Result<Json<ApiResponse<RegionResponseDto>>> {
    let region = service.get_by_code(RegionLevel::Desa, &kode).await?;
    Ok(Json(ApiResponse::success(
        Some(RegionResponseDto::from_region(region, RegionLevel::Desa)),
        None,
        None,
    )))
}
