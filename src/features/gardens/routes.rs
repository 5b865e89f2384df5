use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::gardens::handlers;
use crate::features::gardens::services::GardenService;

pub fn routes(service: Arc<GardenService>) -> Router {
    Router::new()
        .route(
            "/api/taman-kehati",
            get(handlers::list_taman).post(handlers::create_taman),
        )
        .route("/api/taman-kehati/near", get(handlers::near_taman))
        .route(
            "/api/taman-kehati/{id}",
            get(handlers::get_taman)
                .put(handlers::update_taman)
                .delete(handlers::delete_taman),
        )
        .route("/api/taman-kehati/{id}/geo", get(handlers::get_taman_geo))
        .route("/api/taman-kehati/{id}/stats", get(handlers::get_taman_stats))
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
    use serde_json::json;

    fn router() -> Router {
        routes(Arc::new(GardenService::new(
            lazy_pool(),
            Arc::new(MaskingPolicy::default()),
        )))
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "nama_resmi": "Taman Kehati Bogor",
            "alamat": "Jl. Ir. H. Juanda 13",
            "tipe_taman": "kehati_instansi",
            "provinsi_id": 32,
            "kabupaten_kota_id": 3271
        })
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let server = TestServer::new(router()).unwrap();
        server
            .post("/api/taman-kehati")
            .json(&valid_body())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_garden_admin() {
        let app = with_user(router(), create_user(Role::AdminTaman, Some(1)));
        let server = TestServer::new(app).unwrap();
        server
            .post("/api/taman-kehati")
            .json(&valid_body())
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validates_body() {
        let app = with_user(router(), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();

        let mut body = valid_body();
        body["latitude"] = json!(-6.6);
        server
            .post("/api/taman-kehati")
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_forbidden_for_viewer() {
        let app = with_user(router(), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();
        server
            .put("/api/taman-kehati/1")
            .json(&json!({"nama_resmi": "Baru"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_near_rejects_invalid_point() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/taman-kehati/near")
            .add_query_param("lat", 91)
            .add_query_param("lng", 106.8)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_near_rejects_tiny_radius_for_public_callers() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/taman-kehati/near")
            .add_query_param("lat", -6.2)
            .add_query_param("lng", 106.816666)
            .add_query_param("radius_m", 0.5)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let app = with_user(router(), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();
        server
            .get("/api/taman-kehati/near")
            .add_query_param("lat", -6.2)
            .add_query_param("lng", 106.816666)
            .add_query_param("radius_m", 999)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
