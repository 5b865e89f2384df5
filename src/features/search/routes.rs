use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::search::handlers;
use crate::features::search::services::SearchService;

pub fn routes(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/api/search", get(handlers::search))
        .route("/api/search/suggest", get(handlers::suggest))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    fn router() -> Router {
        routes(Arc::new(SearchService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_short_query_returns_empty_without_searching() {
        let server = TestServer::new(router()).unwrap();
        let response = server
            .get("/api/search")
            .add_query_param("q", "b")
            .add_query_param("entity", "koleksi")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["query"], "b");
        assert_eq!(body["data"]["entity"], "koleksi");
        assert_eq!(body["data"]["total"], 0);
        assert_eq!(body["data"]["results"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_entity_rejected() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/api/search")
            .add_query_param("q", "bambu")
            .add_query_param("entity", "zona")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_short_suggest_returns_empty() {
        let server = TestServer::new(router()).unwrap();
        let response = server.get("/api/search/suggest").add_query_param("q", " a ").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], serde_json::json!([]));
    }
}
