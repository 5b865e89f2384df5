use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::media::handlers;
use crate::features::media::services::MediaService;
use crate::shared::constants::MAX_VIDEO_BYTES;

// Largest accepted file plus room for the other multipart fields
const UPLOAD_BODY_LIMIT: usize = MAX_VIDEO_BYTES + 1024 * 1024;

pub fn routes(service: Arc<MediaService>) -> Router {
    Router::new()
        .route(
            "/api/media",
            get(handlers::list_media)
                .post(handlers::upload_media)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/media/{id}",
            get(handlers::get_media)
                .patch(handlers::update_media)
                .delete(handlers::delete_media),
        )
        .route("/api/koleksi/{id}/media", get(handlers::list_koleksi_media))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::core::error::AppError;
    use crate::features::auth::model::Role;
    use crate::modules::storage::ObjectStorage;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    /// Records uploads instead of talking to MinIO
    #[derive(Default)]
    struct RecordingStorage {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn upload(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
            self.uploads.lock().unwrap().push(key.to_string());
            Ok(key.to_string())
        }

        async fn delete(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }

        fn media_key(&self, folder: &str, file_name: &str) -> String {
            format!("media/{}/{}", folder, file_name)
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://storage.test/kehati/{}", key)
        }
    }

    fn router(storage: Arc<RecordingStorage>) -> Router {
        routes(Arc::new(MediaService::new(lazy_pool(), storage)))
    }

    fn photo_form(taman_kehati_id: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("media_type", "foto")
            .add_text("media_category", "bunga")
            .add_text("taman_kehati_id", taman_kehati_id)
            .add_part(
                "file",
                Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                    .file_name("rafflesia.jpg")
                    .mime_type("image/jpeg"),
            )
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let storage = Arc::new(RecordingStorage::default());
        let app = with_user(router(storage.clone()), create_user(Role::Viewer, None));
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/media")
            .multipart(photo_form("1"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_outside_own_garden_never_reaches_storage() {
        let storage = Arc::new(RecordingStorage::default());
        let app = with_user(router(storage.clone()), create_user(Role::AdminTaman, Some(2)));
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/media")
            .multipart(photo_form("1"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_mime_type() {
        let storage = Arc::new(RecordingStorage::default());
        let app = with_user(router(storage.clone()), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();

        let form = MultipartForm::new()
            .add_text("media_type", "video")
            .add_text("taman_kehati_id", "1")
            .add_part(
                "file",
                Part::bytes(vec![0x89, 0x50, 0x4E, 0x47])
                    .file_name("daun.png")
                    .mime_type("image/png"),
            );

        server
            .post("/api/media")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_file_and_owner() {
        let storage = Arc::new(RecordingStorage::default());
        let app = with_user(router(storage.clone()), create_user(Role::SuperAdmin, None));
        let server = TestServer::new(app).unwrap();

        let no_file = MultipartForm::new().add_text("taman_kehati_id", "1");
        server
            .post("/api/media")
            .multipart(no_file)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let no_owner = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0xFF, 0xD8]).file_name("a.jpg").mime_type("image/jpeg"),
        );
        server
            .post("/api/media")
            .multipart(no_owner)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_koleksi_media_requires_numeric_id() {
        let server = TestServer::new(router(Arc::new(RecordingStorage::default()))).unwrap();
        server
            .get("/api/koleksi/rafflesia/media")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
