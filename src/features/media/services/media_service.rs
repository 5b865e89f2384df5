use std::sync::Arc;

use sqlx::{PgConnection, PgPool};

use crate::core::error::{handle_db_error, handle_delete_error, AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::{snapshot, AuditEntry, AuditService};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::media::dtos::{MediaListQuery, MediaUpload, UpdateMediaDto};
use crate::features::media::models::{Media, SELECT_COLUMNS, TABLE_NAME};
use crate::modules::storage::ObjectStorage;
use crate::shared::types::PaginationQuery;

/// Media metadata in Postgres, file content in object storage
pub struct MediaService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl MediaService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { pool, storage }
    }

    pub fn public_url(&self, media: &Media) -> String {
        self.storage.public_url(&media.file_path)
    }

    async fn fetch(conn: &mut PgConnection, id: i32, for_update: bool) -> Result<Media> {
        let sql = format!(
            "SELECT {} FROM media m WHERE m.id = $1{}",
            SELECT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        sqlx::query_as::<_, Media>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch media {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))
    }

    async fn collection_garden(conn: &mut PgConnection, koleksi_id: i32) -> Result<i32> {
        sqlx::query_scalar::<_, i32>("SELECT taman_kehati_id FROM koleksi_tumbuhan WHERE id = $1")
            .bind(koleksi_id)
            .fetch_optional(conn)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Koleksi {} not found", koleksi_id)))
    }

    /// Check the caller may manage media linked to this garden and/or collection
    async fn ensure_scope(
        conn: &mut PgConnection,
        user: &AuthenticatedUser,
        taman_kehati_id: Option<i32>,
        koleksi_tumbuhan_id: Option<i32>,
    ) -> Result<()> {
        if let Some(taman_id) = taman_kehati_id {
            user.ensure_taman_access(taman_id)?;
        }

        if let Some(koleksi_id) = koleksi_tumbuhan_id {
            let garden = Self::collection_garden(conn, koleksi_id).await?;
            user.ensure_taman_access(garden)?;

            if let Some(taman_id) = taman_kehati_id.filter(|t| *t != garden) {
                return Err(AppError::BadRequest(format!(
                    "Koleksi {} does not belong to Taman Kehati {}",
                    koleksi_id, taman_id
                )));
            }
        }

        Ok(())
    }

    pub async fn list(
        &self,
        query: &MediaListQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Media>, i64)> {
        let filter = r#"
            WHERE ($1::int4 IS NULL OR m.taman_kehati_id = $1)
              AND ($2::int4 IS NULL OR m.koleksi_tumbuhan_id = $2)
              AND ($3::mediatypeenum IS NULL OR m.media_type = $3)
              AND ($4::bool IS NULL OR m.is_main_image = $4)
        "#;

        let sql = format!(
            "SELECT {} FROM media m {} ORDER BY m.is_main_image DESC, m.created_at DESC, m.id DESC OFFSET $5 LIMIT $6",
            SELECT_COLUMNS, filter
        );
        let media = sqlx::query_as::<_, Media>(&sql)
            .bind(query.taman_kehati_id)
            .bind(query.koleksi_tumbuhan_id)
            .bind(query.media_type)
            .bind(query.is_main_image)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list media: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM media m {}", filter);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(query.taman_kehati_id)
            .bind(query.koleksi_tumbuhan_id)
            .bind(query.media_type)
            .bind(query.is_main_image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count media: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((media, total))
    }

    /// Media attached to one collection, main image first. 404 for unknown collections.
    pub async fn list_for_koleksi(
        &self,
        koleksi_tumbuhan_id: i32,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Media>, i64)> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM koleksi_tumbuhan WHERE id = $1)",
        )
        .bind(koleksi_tumbuhan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up koleksi_tumbuhan {}: {:?}", koleksi_tumbuhan_id, e);
            AppError::Database(e)
        })?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Koleksi {} not found",
                koleksi_tumbuhan_id
            )));
        }

        let query = MediaListQuery {
            koleksi_tumbuhan_id: Some(koleksi_tumbuhan_id),
            ..Default::default()
        };
        self.list(&query, pagination).await
    }

    pub async fn get(&self, id: i32) -> Result<Media> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        Self::fetch(&mut conn, id, false).await
    }

    /// Store the file, then record it. The object is removed again if the row cannot be written.
    pub async fn upload(
        &self,
        mut upload: MediaUpload,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Media> {
        // Garden-only uploads are decided without a round trip
        if upload.koleksi_tumbuhan_id.is_none() {
            if let Some(taman_id) = upload.taman_kehati_id {
                user.ensure_taman_access(taman_id)?;
            }
        } else {
            let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
            Self::ensure_scope(
                &mut conn,
                user,
                upload.taman_kehati_id,
                upload.koleksi_tumbuhan_id,
            )
            .await?;
        }

        let key = self
            .storage
            .media_key(upload.media_type.folder(), &upload.file_name);
        let data = std::mem::take(&mut upload.data);
        let file_size = i32::try_from(data.len()).ok();
        let key = self
            .storage
            .upload(&key, data, &upload.content_type)
            .await?;

        match self.insert(&key, file_size, &upload, user, client).await {
            Ok(media) => {
                tracing::info!("Uploaded media {} as '{}'", media.id, key);
                Ok(media)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!("Failed to remove orphaned object '{}': {}", key, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn insert(
        &self,
        key: &str,
        file_size: Option<i32>,
        upload: &MediaUpload,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Media> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO media (
                taman_kehati_id, koleksi_tumbuhan_id, media_type, media_category,
                file_name, file_path, file_size, mime_type, caption, is_main_image, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10)
            RETURNING id
            "#,
        )
        .bind(upload.taman_kehati_id)
        .bind(upload.koleksi_tumbuhan_id)
        .bind(upload.media_type)
        .bind(upload.media_category)
        .bind(&upload.file_name)
        .bind(key)
        .bind(file_size)
        .bind(&upload.content_type)
        .bind(&upload.caption)
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, "Media already exists"))?;

        let created = Self::fetch(&mut tx, id, false).await?;
        AuditService::record(
            &mut tx,
            AuditEntry::created(user.user_id, TABLE_NAME, id, snapshot(&created), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        dto: UpdateMediaDto,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Media> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        Self::ensure_scope(
            &mut tx,
            user,
            current.taman_kehati_id,
            current.koleksi_tumbuhan_id,
        )
        .await?;

        if dto.is_main_image == Some(true) {
            // One main image per collection, or per garden for garden-level media
            sqlx::query(
                r#"
                UPDATE media SET is_main_image = FALSE
                WHERE id <> $1 AND is_main_image
                  AND (($2::int4 IS NOT NULL AND koleksi_tumbuhan_id = $2)
                       OR ($2::int4 IS NULL AND koleksi_tumbuhan_id IS NULL
                           AND taman_kehati_id = $3))
                "#,
            )
            .bind(id)
            .bind(current.koleksi_tumbuhan_id)
            .bind(current.taman_kehati_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear main image flag for media {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        }

        sqlx::query(
            r#"
            UPDATE media SET
                caption = COALESCE($2, caption),
                is_main_image = COALESCE($3, is_main_image)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&dto.caption)
        .bind(dto.is_main_image)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update media {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let updated = Self::fetch(&mut tx, id, false).await?;
        AuditService::record(
            &mut tx,
            AuditEntry::updated(
                user.user_id,
                TABLE_NAME,
                id,
                snapshot(&current),
                snapshot(&updated),
                client,
            ),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Updated media {}", id);
        Ok(updated)
    }

    /// Delete the row, then the stored object. A failed object delete is logged, not returned.
    pub async fn delete(
        &self,
        id: i32,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        Self::ensure_scope(
            &mut tx,
            user,
            current.taman_kehati_id,
            current.koleksi_tumbuhan_id,
        )
        .await?;

        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_delete_error(e, "Media"))?;

        AuditService::record(
            &mut tx,
            AuditEntry::deleted(user.user_id, TABLE_NAME, id, snapshot(&current), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        if let Err(e) = self.storage.delete(&current.file_path).await {
            tracing::warn!("Media {} deleted but object '{}' remains: {}", id, current.file_path, e);
        }

        tracing::info!("Deleted media {}", id);
        Ok(())
    }
}
