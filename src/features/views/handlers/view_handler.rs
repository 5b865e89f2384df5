use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo};
use crate::features::auth::guards::RequireAdmin;
use crate::features::views::dtos::{
    SeriesQuery, TopQuery, TopViewDto, TrackViewDto, TrackedViewDto, ViewSeriesDto,
};
use crate::features::views::services::ViewService;
use crate::shared::types::ApiResponse;

/// Track a public page view
#[utoipa::path(
    post,
    path = "/api/views/track",
    request_body = TrackViewDto,
    responses(
        (status = 201, description = "View tracked", body = ApiResponse<TrackedViewDto>),
        (status = 400, description = "Missing target or unknown garden/collection")
    ),
    tag = "views"
)]
pub async fn track_view(
    client: ClientInfo,
    State(service): State<Arc<ViewService>>,
    AppJson(dto): AppJson<TrackViewDto>,
) -> Result<(StatusCode, Json<ApiResponse<TrackedViewDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let dto = dto.with_client(&client);
    let id = service.track(&dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(TrackedViewDto { id }),
            Some("View tracked successfully".to_string()),
            None,
        )),
    ))
}

/// View count time series for a garden, collection or article
#[utoipa::path(
    get,
    path = "/api/views/series",
    params(SeriesQuery),
    responses(
        (status = 200, description = "View series", body = ApiResponse<ViewSeriesDto>),
        (status = 400, description = "Invalid entity, range or interval"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "views",
    security(("bearer_auth" = []))
)]
pub async fn view_series(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ViewService>>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<ViewSeriesDto>>> {
    let rows = service.series(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(ViewSeriesDto::new(&query, rows)),
        None,
        None,
    )))
}

/// Most viewed collections or articles
#[utoipa::path(
    get,
    path = "/api/views/top",
    params(TopQuery),
    responses(
        (status = 200, description = "Top viewed entities", body = ApiResponse<Vec<TopViewDto>>),
        (status = 400, description = "Invalid entity or range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "views",
    security(("bearer_auth" = []))
)]
pub async fn top_views(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ViewService>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<ApiResponse<Vec<TopViewDto>>>> {
    let rows = service.top(&query).await?;
    let dtos = rows
        .into_iter()
        .map(|row| TopViewDto::new(row, query.entity))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}
