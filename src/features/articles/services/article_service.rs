use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::core::error::{handle_db_error, handle_delete_error, AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::articles::dtos::{
    ArtikelListQuery, ArtikelWrite, CreateArtikelDto, UpdateArtikelDto,
};
use crate::features::articles::models::{Artikel, SELECT_COLUMNS, TABLE_NAME};
use crate::features::audit::{snapshot, AuditEntry, AuditService};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::enums::StatusPublikasi;
use crate::shared::etag::{check_precondition, generate_etag};
use crate::shared::slug::{candidate, slugify};
use crate::shared::types::PaginationQuery;

const DUPLICATE_SLUG: &str = "An article with this slug already exists";

/// Base slug used when a title has no letters or digits
const FALLBACK_SLUG: &str = "artikel";

/// Articles without a garden are open to every admin
fn ensure_article_scope(user: &AuthenticatedUser, taman_kehati_id: Option<i32>) -> Result<()> {
    match taman_kehati_id {
        Some(taman_id) => user.ensure_taman_access(taman_id),
        None => Ok(()),
    }
}

/// Service for articles
pub struct ArticleService {
    pool: PgPool,
}

impl ArticleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(conn: &mut PgConnection, id: i32, for_update: bool) -> Result<Artikel> {
        let sql = format!(
            "SELECT {} FROM artikel a WHERE a.id = $1{}",
            SELECT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        sqlx::query_as::<_, Artikel>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch artikel {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Artikel {} not found", id)))
    }

    /// First free slug for `title`: `slug`, `slug-1`, `slug-2`, ...
    async fn unique_slug(
        conn: &mut PgConnection,
        title: &str,
        exclude_id: Option<i32>,
    ) -> Result<String> {
        let base = match slugify(title) {
            s if s.is_empty() => FALLBACK_SLUG.to_string(),
            s => s,
        };

        let mut attempt = 0;
        loop {
            let slug = candidate(&base, attempt);
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM artikel WHERE slug = $1 AND ($2::int4 IS NULL OR id <> $2))",
            )
            .bind(&slug)
            .bind(exclude_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(AppError::Database)?;

            if !taken {
                return Ok(slug);
            }
            attempt += 1;
        }
    }

    pub async fn list(
        &self,
        query: &ArtikelListQuery,
        status: Option<StatusPublikasi>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Artikel>, i64)> {
        let pattern = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let filter = r#"
            WHERE ($1::text IS NULL
                   OR a.judul ILIKE $1 OR a.ringkasan ILIKE $1 OR a.konten ILIKE $1)
              AND ($2::statuspublikasienum IS NULL OR a.status = $2)
              AND ($3::int4 IS NULL OR a.taman_kehati_id = $3)
              AND ($4::text IS NULL OR a.kategori = $4)
        "#;

        let sql = format!(
            "SELECT {} FROM artikel a {} ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id DESC OFFSET $5 LIMIT $6",
            SELECT_COLUMNS, filter
        );
        let articles = sqlx::query_as::<_, Artikel>(&sql)
            .bind(pattern.as_deref())
            .bind(status)
            .bind(query.taman_kehati_id)
            .bind(query.kategori.as_deref())
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list artikel: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM artikel a {}", filter);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(pattern.as_deref())
            .bind(status)
            .bind(query.taman_kehati_id)
            .bind(query.kategori.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count artikel: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((articles, total))
    }

    pub async fn get(&self, id: i32) -> Result<Artikel> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        Self::fetch(&mut conn, id, false).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Artikel> {
        let sql = format!("SELECT {} FROM artikel a WHERE a.slug = $1", SELECT_COLUMNS);

        sqlx::query_as::<_, Artikel>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch artikel '{}': {:?}", slug, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Artikel '{}' not found", slug)))
    }

    /// Published articles sharing the garden, author or category of `artikel`
    pub async fn related(&self, artikel: &Artikel, limit: i64) -> Result<Vec<Artikel>> {
        let sql = format!(
            r#"
            SELECT {} FROM artikel a
            WHERE a.id <> $1
              AND a.status = 'published'
              AND ((a.taman_kehati_id IS NOT NULL AND a.taman_kehati_id = $2)
                   OR a.author_id = $3
                   OR (a.kategori IS NOT NULL AND a.kategori = $4))
            ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id DESC
            LIMIT $5
            "#,
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, Artikel>(&sql)
            .bind(artikel.id)
            .bind(artikel.taman_kehati_id)
            .bind(artikel.author_id)
            .bind(artikel.kategori.as_deref())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load related artikel for {}: {:?}", artikel.id, e);
                AppError::Database(e)
            })
    }

    pub async fn create(
        &self,
        dto: CreateArtikelDto,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Artikel> {
        ensure_article_scope(user, dto.taman_kehati_id)?;
        let values = ArtikelWrite::from(dto);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let slug = Self::unique_slug(&mut tx, &values.judul, None).await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO artikel (
                judul, slug, ringkasan, konten, cover_image_id, taman_kehati_id,
                kategori, tags, status, published_at, author_id
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                CASE WHEN $9 = 'published'::statuspublikasienum THEN NOW() END, $10
            )
            RETURNING id
            "#,
        )
        .bind(&values.judul)
        .bind(&slug)
        .bind(&values.ringkasan)
        .bind(&values.konten)
        .bind(values.cover_image_id)
        .bind(values.taman_kehati_id)
        .bind(&values.kategori)
        .bind(values.tags.as_ref().map(Json))
        .bind(values.status)
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_SLUG))?;

        let created = Self::fetch(&mut tx, id, false).await?;
        AuditService::record(
            &mut tx,
            AuditEntry::created(user.user_id, TABLE_NAME, id, snapshot(&created), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created artikel {} '{}'", id, created.slug);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        dto: UpdateArtikelDto,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Artikel> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        ensure_article_scope(user, current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        let values = dto.merge(&current);
        if values.taman_kehati_id != current.taman_kehati_id {
            ensure_article_scope(user, values.taman_kehati_id)?;
        }

        let slug = if values.judul != current.judul {
            Self::unique_slug(&mut tx, &values.judul, Some(id)).await?
        } else {
            current.slug.clone()
        };

        sqlx::query(
            r#"
            UPDATE artikel SET
                judul = $2, slug = $3, ringkasan = $4, konten = $5, cover_image_id = $6,
                taman_kehati_id = $7, kategori = $8, tags = $9, status = $10,
                published_at = CASE
                    WHEN $10 = 'published'::statuspublikasienum THEN COALESCE(published_at, NOW())
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&values.judul)
        .bind(&slug)
        .bind(&values.ringkasan)
        .bind(&values.konten)
        .bind(values.cover_image_id)
        .bind(values.taman_kehati_id)
        .bind(&values.kategori)
        .bind(values.tags.as_ref().map(Json))
        .bind(values.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_SLUG))?;

        let updated = Self::audit_update(&mut tx, id, &current, user, client).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Updated artikel {}", id);
        Ok(updated)
    }

    /// Mark published; the first publication time is kept on republish
    pub async fn publish(
        &self,
        id: i32,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Artikel> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        ensure_article_scope(user, current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        sqlx::query(
            r#"
            UPDATE artikel SET
                status = 'published',
                published_at = COALESCE(published_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to publish artikel {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let updated = Self::audit_update(&mut tx, id, &current, user, client).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Published artikel {}", id);
        Ok(updated)
    }

    pub async fn set_cover(
        &self,
        id: i32,
        cover_image_id: i32,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Artikel> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        ensure_article_scope(user, current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        sqlx::query("UPDATE artikel SET cover_image_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(cover_image_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_db_error(e, "Cover image could not be set"))?;

        let updated = Self::audit_update(&mut tx, id, &current, user, client).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Set cover of artikel {} to media {}", id, cover_image_id);
        Ok(updated)
    }

    async fn audit_update(
        conn: &mut PgConnection,
        id: i32,
        before: &Artikel,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Artikel> {
        let updated = Self::fetch(&mut *conn, id, false).await?;
        AuditService::record(
            conn,
            AuditEntry::updated(
                user.user_id,
                TABLE_NAME,
                id,
                snapshot(before),
                snapshot(&updated),
                client,
            ),
        )
        .await?;
        Ok(updated)
    }

    pub async fn delete(
        &self,
        id: i32,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        ensure_article_scope(user, current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        sqlx::query("DELETE FROM artikel WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_delete_error(e, "Artikel"))?;

        AuditService::record(
            &mut tx,
            AuditEntry::deleted(user.user_id, TABLE_NAME, id, snapshot(&current), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Deleted artikel {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_article_scope() {
        let own = create_user(Role::AdminTaman, Some(3));
        assert!(ensure_article_scope(&own, Some(3)).is_ok());
        assert!(ensure_article_scope(&own, None).is_ok());
        assert!(matches!(
            ensure_article_scope(&own, Some(4)),
            Err(AppError::Forbidden(_))
        ));

        let super_admin = create_user(Role::SuperAdmin, None);
        assert!(ensure_article_scope(&super_admin, Some(4)).is_ok());
    }
}
