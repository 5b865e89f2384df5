use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::audit::dtos::{AuditLogQuery, AuditLogResponseDto};
use crate::features::audit::services::AuditService;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List audit log entries (super admin only)
#[utoipa::path(
    get,
    path = "/api/audit",
    params(AuditLogQuery, PaginationQuery),
    responses(
        (status = 200, description = "Audit log entries", body = ApiResponse<Vec<AuditLogResponseDto>>),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Super admin access required")
    ),
    tag = "audit",
    security(("bearer_auth" = []))
)]
pub async fn list_audit_logs(
    RequireSuperAdmin(_user): RequireSuperAdmin,
    State(service): State<Arc<AuditService>>,
    Query(query): Query<AuditLogQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogResponseDto>>>> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
        if from > to {
            return Err(AppError::BadRequest(
                "date_from must not be after date_to".to_string(),
            ));
        }
    }

    let (rows, total) = service.list(&query, &pagination).await?;
    let dtos = rows.into_iter().map(AuditLogResponseDto::from).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Meta::total(total))))
}
