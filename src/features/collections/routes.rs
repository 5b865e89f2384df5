use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::collections::handlers;
use crate::features::collections::services::CollectionService;

pub fn routes(service: Arc<CollectionService>) -> Router {
    Router::new()
        .route(
            "/api/koleksi",
            get(handlers::list_koleksi).post(handlers::create_koleksi),
        )
        .route("/api/koleksi/suggest", get(handlers::suggest_koleksi))
        .route("/api/koleksi/stats", get(handlers::koleksi_stats))
        .route("/api/koleksi/map", get(handlers::koleksi_map_points))
        .route("/api/koleksi/export/geojson", get(handlers::export_geojson))
        .route("/api/koleksi/export/dwc", get(handlers::export_darwin_core))
        .route(
            "/api/koleksi/{id}",
            get(handlers::get_koleksi)
                .put(handlers::update_koleksi)
                .delete(handlers::delete_koleksi),
        )
        .route("/api/koleksi/{id}/relations", get(handlers::koleksi_relations))
        .route("/api/zona/{id}/koleksi", get(handlers::list_zona_koleksi))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::geo_masking::MaskingPolicy;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn router() -> Router {
        routes(Arc::new(CollectionService::new(
            lazy_pool(),
            Arc::new(MaskingPolicy::default()),
        )))
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .post("/api/koleksi")
            .json(&json!({"taman_kehati_id": 1, "nama_ilmiah": "Rafflesia arnoldii"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_outside_own_garden_forbidden() {
        let app = with_user(router(), create_user(Role::AdminTaman, Some(2)));
        let server = TestServer::new(app).unwrap();
        server
            .post("/api/koleksi")
            .json(&json!({"taman_kehati_id": 1, "nama_ilmiah": "Rafflesia arnoldii"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_rejects_half_coordinate() {
        let app = with_user(router(), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();
        server
            .post("/api/koleksi")
            .json(&json!({
                "taman_kehati_id": 1,
                "nama_ilmiah": "Rafflesia arnoldii",
                "latitude_asal": -3.8
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_viewer_cannot_delete() {
        let app = with_user(router(), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();
        server
            .delete("/api/koleksi/1")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_short_suggest_query_is_empty_without_database() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/koleksi/suggest").add_query_param("q", "r").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_stats_rejects_unknown_group() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/koleksi/stats")
            .add_query_param("group_by", "warna_bunga")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort_before_querying() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/koleksi")
            .add_query_param("sort", "password")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sub_resources_reject_bad_parameters() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/koleksi/ulin/relations")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/zona/inti/koleksi")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/zona/1/koleksi")
            .add_query_param("status", "dihapus")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
