use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::zones::handlers;
use crate::features::zones::services::ZoneService;

pub fn routes(service: Arc<ZoneService>) -> Router {
    Router::new()
        .route("/api/zona", get(handlers::list_zona).post(handlers::create_zona))
        .route("/api/zona/import", post(handlers::import_zona))
        .route(
            "/api/zona/{id}",
            get(handlers::get_zona)
                .put(handlers::update_zona)
                .delete(handlers::delete_zona),
        )
        .route("/api/zona/{id}/geo", get(handlers::get_zona_geo))
        .with_state(service)
}
