use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::MaybeUser;
use crate::features::collections::dtos::{
    koleksi_feature_collection, DarwinCoreExportDto, DarwinCoreRecord, ExportQuery,
};
use crate::features::collections::services::CollectionService;
use crate::shared::geojson::FeatureCollection;
use crate::shared::types::ApiResponse;

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

/// Collections as a GeoJSON FeatureCollection of points
///
/// The body is plain GeoJSON so GIS tools can load it directly. Collections
/// without coordinates are skipped.
#[utoipa::path(
    get,
    path = "/api/koleksi/export/geojson",
    params(ExportQuery),
    responses(
        (status = 200, description = "GeoJSON FeatureCollection", body = FeatureCollection,
         content_type = "application/geo+json")
    ),
    tag = "export"
)]
pub async fn export_geojson(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let rows = service.export(&query).await?;
    let koleksi: Vec<_> = rows.into_iter().map(|row| row.koleksi).collect();
    let collection = koleksi_feature_collection(&koleksi, service.masking(), caller.role());

    tracing::info!(
        "Exported {} GeoJSON features from {} collections",
        collection.features.len(),
        koleksi.len()
    );

    let mut response = Json(collection).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(GEOJSON_CONTENT_TYPE),
    );
    Ok(response)
}

/// Collections as Darwin Core occurrence records
#[utoipa::path(
    get,
    path = "/api/koleksi/export/dwc",
    params(ExportQuery),
    responses(
        (status = 200, description = "Darwin Core records", body = ApiResponse<DarwinCoreExportDto>)
    ),
    tag = "export"
)]
pub async fn export_darwin_core(
    caller: MaybeUser,
    State(service): State<Arc<CollectionService>>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ApiResponse<DarwinCoreExportDto>>> {
    let rows = service.export(&query).await?;
    let records: Vec<_> = rows
        .iter()
        .map(|row| DarwinCoreRecord::from_row(row, service.masking(), caller.role()))
        .collect();

    tracing::info!("Exported {} Darwin Core records", records.len());

    Ok(Json(ApiResponse::success(
        Some(DarwinCoreExportDto {
            count: records.len(),
            records,
        }),
        None,
        None,
    )))
}
