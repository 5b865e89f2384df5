use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::regions::handlers;
use crate::features::regions::services::RegionService;

/// Create routes for the regions feature
pub fn routes(service: Arc<RegionService>) -> Router {
    Router::new()
        .route("/api/regions/provinsi", get(handlers::list_provinsi))
        .route("/api/regions/provinsi/{kode}", get(handlers::get_provinsi))
        .route(
            "/api/regions/provinsi/{kode}/kabupaten-kota",
            get(handlers::list_kabupaten_kota),
        )
        .route(
            "/api/regions/kabupaten-kota/{kode}",
            get(handlers::get_kabupaten_kota),
        )
        .route(
            "/api/regions/kabupaten-kota/{kode}/kecamatan",
            get(handlers::list_kecamatan),
        )
        .route("/api/regions/kecamatan/{kode}", get(handlers::get_kecamatan))
        .route(
            "/api/regions/kecamatan/{kode}/desa",
            get(handlers::list_desa),
        )
        .route("/api/regions/desa/{kode}", get(handlers::get_desa))
        .with_state(service)
}
