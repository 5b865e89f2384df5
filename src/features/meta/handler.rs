use axum::Json;

use crate::features::meta::dto::MetaEnumsDto;
use crate::shared::types::ApiResponse;

/// Enum values for client forms and filters
#[utoipa::path(
    get,
    path = "/api/meta/enums",
    responses(
        (status = 200, description = "Accepted values of every enumerated field", body = ApiResponse<MetaEnumsDto>)
    ),
    tag = "meta"
)]
pub async fn get_enums() -> Json<ApiResponse<MetaEnumsDto>> {
    tracing::debug!("Serving enum values");
    Json(ApiResponse::success(Some(MetaEnumsDto::default()), None, None))
}
