use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::search::dtos::SearchEntity;
use crate::features::search::models::SearchRow;
use crate::shared::constants::SEARCH_SUGGESTIONS_PER_SOURCE;
use crate::shared::validation::escape_like;

/// Ranked hits across the three searchable tables.
///
/// $1 query text, $2 entity filter, $3 include unpublished rows, $4 limit.
/// The `simple` configuration is used since stock PostgreSQL ships no
/// Indonesian stemmer.
const SEARCH_SQL: &str = r#"
    WITH query AS (SELECT websearch_to_tsquery('simple', $1) AS tsq)
    SELECT id, entity_type, title, slug, snippet, score FROM (
        SELECT t.id, 'taman'::text AS entity_type, t.nama_resmi AS title, NULL::text AS slug,
               ts_headline('simple', concat_ws(' ', t.alamat, t.deskripsi), query.tsq,
                           'MaxWords=30, MinWords=10, StartSel=<b>, StopSel=</b>') AS snippet,
               ts_rank(d.doc, query.tsq)::float8 AS score
        FROM taman_kehati t
        CROSS JOIN query
        CROSS JOIN LATERAL (
            SELECT to_tsvector('simple', concat_ws(' ', t.nama_resmi, t.alamat, t.deskripsi)) AS doc
        ) d
        WHERE $2::text IN ('all', 'taman')
          AND ($3::bool OR t.status = 'published')
          AND d.doc @@ query.tsq

        UNION ALL

        SELECT k.id, 'koleksi'::text, k.nama_ilmiah, NULL::text,
               ts_headline('simple',
                           concat_ws(' ', k.nama_umum_nasional, k.nama_lokal_daerah,
                                     k.bentuk_pohon, k.bentuk_daun, k.habitat_alami,
                                     k.manfaat_masyarakat),
                           query.tsq,
                           'MaxWords=30, MinWords=10, StartSel=<b>, StopSel=</b>'),
               ts_rank(d.doc, query.tsq)::float8
        FROM koleksi_tumbuhan k
        CROSS JOIN query
        CROSS JOIN LATERAL (
            SELECT to_tsvector('simple', concat_ws(' ',
                k.nama_ilmiah, k.nama_umum_nasional, k.nama_lokal_daerah, k.genus, k.spesies,
                k.bentuk_pohon, k.bentuk_daun, k.bentuk_bunga, k.bentuk_buah,
                k.habitat_alami, k.manfaat_masyarakat)) AS doc
        ) d
        WHERE $2::text IN ('all', 'koleksi')
          AND ($3::bool OR k.status = 'published')
          AND d.doc @@ query.tsq

        UNION ALL

        SELECT a.id, 'artikel'::text, a.judul, a.slug,
               ts_headline('simple', concat_ws(' ', a.ringkasan, a.konten), query.tsq,
                           'MaxWords=30, MinWords=10, StartSel=<b>, StopSel=</b>'),
               ts_rank(d.doc, query.tsq)::float8
        FROM artikel a
        CROSS JOIN query
        CROSS JOIN LATERAL (
            SELECT to_tsvector('simple', concat_ws(' ', a.judul, a.ringkasan, a.konten)) AS doc
        ) d
        WHERE $2::text IN ('all', 'artikel')
          AND ($3::bool OR a.status = 'published')
          AND d.doc @@ query.tsq
    ) hits
    ORDER BY score DESC, entity_type ASC, id ASC
    LIMIT $4
"#;

pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn search(
        &self,
        terms: &str,
        entity: SearchEntity,
        include_unpublished: bool,
        limit: i64,
    ) -> Result<Vec<SearchRow>> {
        let rows = sqlx::query_as::<_, SearchRow>(SEARCH_SQL)
            .bind(terms)
            .bind(entity.as_str())
            .bind(include_unpublished)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Search for '{}' failed: {:?}", terms, e);
                AppError::Database(e)
            })?;

        tracing::debug!(
            entity = entity.as_str(),
            hits = rows.len(),
            "Full-text search completed"
        );
        Ok(rows)
    }

    /// Garden and collection names containing `terms`, as `(taman, koleksi)`
    pub async fn suggest(
        &self,
        terms: &str,
        include_unpublished: bool,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let pattern = format!("%{}%", escape_like(terms));

        let taman = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT nama_resmi FROM taman_kehati
            WHERE nama_resmi ILIKE $1 AND ($2::bool OR status = 'published')
            ORDER BY nama_resmi ASC
            LIMIT $3
            "#,
        )
        .bind(&pattern)
        .bind(include_unpublished)
        .bind(SEARCH_SUGGESTIONS_PER_SOURCE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to suggest taman names for '{}': {:?}", terms, e);
            AppError::Database(e)
        })?;

        let koleksi = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT nama_ilmiah FROM koleksi_tumbuhan
            WHERE nama_ilmiah ILIKE $1 AND ($2::bool OR status = 'published')
            ORDER BY nama_ilmiah ASC
            LIMIT $3
            "#,
        )
        .bind(&pattern)
        .bind(include_unpublished)
        .bind(SEARCH_SUGGESTIONS_PER_SOURCE)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to suggest koleksi names for '{}': {:?}", terms, e);
            AppError::Database(e)
        })?;

        Ok((taman, koleksi))
    }
}
