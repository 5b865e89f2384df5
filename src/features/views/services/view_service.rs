use sqlx::PgPool;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::views::dtos::{
    artikel_page_type, SeriesQuery, TopEntity, TopQuery, TrackViewDto, ViewEntity,
};
use crate::features::views::models::{SeriesRow, TopRow, TABLE_NAME};

pub struct ViewService {
    pool: PgPool,
}

impl ViewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a page view. Client details are expected to be filled already.
    pub async fn track(&self, dto: &TrackViewDto) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(&format!(
            r#"
            INSERT INTO {TABLE_NAME}
                (taman_kehati_id, koleksi_tumbuhan_id, page_type, ip_address,
                 user_agent, referrer, session_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#
        ))
        .bind(dto.taman_kehati_id)
        .bind(dto.koleksi_tumbuhan_id)
        .bind(&dto.page_type)
        .bind(dto.ip_address.as_deref())
        .bind(dto.user_agent.as_deref())
        .bind(dto.referrer.as_deref())
        .bind(dto.session_id.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "Failed to track view"))?;

        tracing::debug!("Tracked {} view {}", dto.page_type, id);
        Ok(id)
    }

    /// View counts for one entity bucketed by the requested interval
    pub async fn series(&self, query: &SeriesQuery) -> Result<Vec<SeriesRow>> {
        let (taman_id, koleksi_id, page_type) = match query.entity {
            ViewEntity::Taman => (Some(query.id), None, None),
            ViewEntity::Koleksi => (None, Some(query.id), None),
            ViewEntity::Artikel => (None, None, Some(artikel_page_type(query.id))),
        };

        let sql = format!(
            r#"
            SELECT DATE_TRUNC($1, pv.created_at) AS bucket, COUNT(*) AS count
            FROM {TABLE_NAME} pv
            WHERE pv.created_at >= NOW() - make_interval(days => $2)
              AND ($3::int4 IS NULL OR pv.taman_kehati_id = $3)
              AND ($4::int4 IS NULL OR pv.koleksi_tumbuhan_id = $4)
              AND ($5::text IS NULL OR pv.page_type = $5)
            GROUP BY bucket
            ORDER BY bucket
            "#
        );

        sqlx::query_as::<_, SeriesRow>(&sql)
            .bind(query.interval.as_str())
            .bind(query.range.days())
            .bind(taman_id)
            .bind(koleksi_id)
            .bind(page_type)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    /// Most viewed collections or articles in the window
    pub async fn top(&self, query: &TopQuery) -> Result<Vec<TopRow>> {
        let sql = match query.entity {
            TopEntity::Koleksi => format!(
                r#"
                SELECT pv.koleksi_tumbuhan_id AS id, k.nama_ilmiah AS title,
                       COUNT(*) AS view_count
                FROM {TABLE_NAME} pv
                LEFT JOIN koleksi_tumbuhan k ON k.id = pv.koleksi_tumbuhan_id
                WHERE pv.koleksi_tumbuhan_id IS NOT NULL
                  AND pv.created_at >= NOW() - make_interval(days => $1)
                  AND ($2::int4 IS NULL OR k.taman_kehati_id = $2)
                GROUP BY pv.koleksi_tumbuhan_id, k.nama_ilmiah
                ORDER BY view_count DESC, id
                LIMIT $3
                "#
            ),
            TopEntity::Artikel => format!(
                r#"
                SELECT a.id, a.judul AS title, COUNT(*) AS view_count
                FROM {TABLE_NAME} pv
                JOIN artikel a ON pv.page_type = 'artikel-' || a.id::text
                WHERE pv.created_at >= NOW() - make_interval(days => $1)
                  AND ($2::int4 IS NULL OR a.taman_kehati_id = $2)
                GROUP BY a.id, a.judul
                ORDER BY view_count DESC, a.id
                LIMIT $3
                "#
            ),
        };

        sqlx::query_as::<_, TopRow>(&sql)
            .bind(query.range.days())
            .bind(query.taman_kehati_id)
            .bind(query.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
