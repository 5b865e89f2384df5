use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::articles::handlers;
use crate::features::articles::services::ArticleService;

pub fn routes(service: Arc<ArticleService>) -> Router {
    Router::new()
        .route(
            "/api/artikel",
            get(handlers::list_artikel).post(handlers::create_artikel),
        )
        .route("/api/artikel/slug/{slug}", get(handlers::get_artikel_by_slug))
        .route(
            "/api/artikel/{id}",
            get(handlers::get_artikel)
                .put(handlers::update_artikel)
                .delete(handlers::delete_artikel),
        )
        .route("/api/artikel/{id}/related", get(handlers::related_artikel))
        .route("/api/artikel/{id}/publish", patch(handlers::publish_artikel))
        .route("/api/artikel/{id}/cover", patch(handlers::set_artikel_cover))
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
        routes(Arc::new(ArticleService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_anonymous_cannot_list_drafts() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/artikel")
            .add_query_param("status", "draft")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_viewer_cannot_publish() {
        let app = with_user(router(), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();
        server
            .patch("/api/artikel/1/publish")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_for_other_garden_forbidden() {
        let app = with_user(router(), create_user(Role::AdminTaman, Some(1)));
        let server = TestServer::new(app).unwrap();
        server
            .post("/api/artikel")
            .json(&json!({
                "judul": "Musim Berbunga Rafflesia",
                "konten": "Rafflesia mekar di Bengkulu.",
                "taman_kehati_id": 9
            }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_requires_content() {
        let app = with_user(router(), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();
        server
            .post("/api/artikel")
            .json(&json!({"judul": "Tanpa isi", "konten": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
