use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::audit::handlers;
use crate::features::audit::services::AuditService;

pub fn routes(service: Arc<AuditService>) -> Router {
    Router::new()
        .route("/api/audit", get(handlers::list_audit_logs))
        .with_state(service)
}
