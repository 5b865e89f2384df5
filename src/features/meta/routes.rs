use axum::{routing::get, Router};

use crate::features::meta::handler;

pub fn routes() -> Router {
    Router::new().route("/api/meta/enums", get(handler::get_enums))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_enums_are_public() {
        let server = TestServer::new(routes()).unwrap();
        let response = server.get("/api/meta/enums").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status_endemik"][0], "endemik");
        assert_eq!(body["data"]["user_role"].as_array().unwrap().len(), 3);
    }
}
