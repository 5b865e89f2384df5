use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::views::handlers;
use crate::features::views::services::ViewService;

pub fn routes(service: Arc<ViewService>) -> Router {
    Router::new()
        .route("/api/views/track", post(handlers::track_view))
        .route("/api/views/series", get(handlers::view_series))
        .route("/api/views/top", get(handlers::top_views))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn router() -> Router {
        routes(Arc::new(ViewService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_track_requires_garden_or_collection() {
        let server = TestServer::new(router()).unwrap();
        server
            .post("/api/views/track")
            .json(&json!({"page_type": "taman"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_series_requires_auth() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/views/series")
            .add_query_param("entity", "taman")
            .add_query_param("id", 1)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_viewer_cannot_read_series() {
        let app = with_user(router(), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();
        server
            .get("/api/views/series")
            .add_query_param("entity", "taman")
            .add_query_param("id", 1)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_entity_rejected() {
        let app = with_user(router(), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();
        server
            .get("/api/views/series")
            .add_query_param("entity", "zona")
            .add_query_param("id", 1)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .get("/api/views/top")
            .add_query_param("entity", "taman")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_range_rejected() {
        let app = with_user(router(), create_user(Role::AdminTaman, Some(1)));
        let server = TestServer::new(app).unwrap();
        server
            .get("/api/views/top")
            .add_query_param("entity", "koleksi")
            .add_query_param("range", "90d")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
