use std::sync::Arc;

use sqlx::{PgConnection, PgPool};

use crate::core::error::{handle_db_error, handle_delete_error, AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::{snapshot, AuditEntry, AuditService};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::gardens::dtos::{
    CreateTamanKehatiDto, TamanKehatiListQuery, TamanKehatiWrite, UpdateTamanKehatiDto,
};
use crate::features::gardens::models::{
    NearbyTaman, TamanKehati, TamanStats, SELECT_COLUMNS, TABLE_NAME,
};
use crate::shared::etag::{check_precondition, generate_etag};
use crate::shared::geo_masking::MaskingPolicy;
use crate::shared::types::PaginationQuery;

/// Service for Taman Kehati records
pub struct GardenService {
    pool: PgPool,
    masking: Arc<MaskingPolicy>,
}

impl GardenService {
    pub fn new(pool: PgPool, masking: Arc<MaskingPolicy>) -> Self {
        Self { pool, masking }
    }

    pub fn masking(&self) -> &MaskingPolicy {
        &self.masking
    }

    /// Load one garden on an existing connection, optionally locking the row
    pub(crate) async fn fetch(
        conn: &mut PgConnection,
        id: i32,
        for_update: bool,
    ) -> Result<TamanKehati> {
        let sql = format!(
            "SELECT {} FROM taman_kehati t WHERE t.id = $1{}",
            SELECT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        sqlx::query_as::<_, TamanKehati>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch taman_kehati {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Taman Kehati {} not found", id)))
    }

    pub async fn list(
        &self,
        query: &TamanKehatiListQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<TamanKehati>, i64)> {
        let pattern = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let filter = r#"
            WHERE ($1::text IS NULL
                   OR t.nama_resmi ILIKE $1 OR t.alamat ILIKE $1 OR t.deskripsi ILIKE $1)
              AND ($2::statuspublikasienum IS NULL OR t.status = $2)
              AND ($3::int4 IS NULL OR t.provinsi_id = $3)
        "#;

        let sql = format!(
            "SELECT {} FROM taman_kehati t {} ORDER BY t.nama_resmi ASC, t.id ASC OFFSET $4 LIMIT $5",
            SELECT_COLUMNS, filter
        );
        let gardens = sqlx::query_as::<_, TamanKehati>(&sql)
            .bind(pattern.as_deref())
            .bind(query.status)
            .bind(query.provinsi_id)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list taman_kehati: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM taman_kehati t {}", filter);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(pattern.as_deref())
            .bind(query.status)
            .bind(query.provinsi_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count taman_kehati: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((gardens, total))
    }

    pub async fn get(&self, id: i32) -> Result<TamanKehati> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        Self::fetch(&mut conn, id, false).await
    }

    /// Gardens whose stored centre point lies within `radius_m` meters, nearest first
    pub async fn near(
        &self,
        lat: f64,
        lng: f64,
        radius_m: f64,
        limit: i64,
    ) -> Result<Vec<NearbyTaman>> {
        let sql = format!(
            r#"
            SELECT {},
                   ST_Distance(t.koordinat::geography, p.geog) AS distance_m
            FROM taman_kehati t,
                 LATERAL (SELECT ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography AS geog) p
            WHERE t.koordinat IS NOT NULL
              AND ST_DWithin(t.koordinat::geography, p.geog, $3)
            ORDER BY distance_m ASC
            LIMIT $4
            "#,
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, NearbyTaman>(&sql)
            .bind(lat)
            .bind(lng)
            .bind(radius_m)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed nearby search at ({}, {}): {:?}", lat, lng, e);
                AppError::Database(e)
            })
    }

    pub async fn stats(&self, id: i32) -> Result<TamanStats> {
        // 404 for unknown gardens rather than all-zero counts
        self.get(id).await?;

        sqlx::query_as::<_, TamanStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM koleksi_tumbuhan WHERE taman_kehati_id = $1) AS koleksi_count,
                (SELECT COUNT(*) FROM artikel WHERE taman_kehati_id = $1) AS artikel_count,
                (SELECT COUNT(*) FROM page_views
                  WHERE taman_kehati_id = $1 AND created_at >= NOW() - INTERVAL '7 days') AS views_7d,
                (SELECT COUNT(*) FROM page_views
                  WHERE taman_kehati_id = $1 AND created_at >= NOW() - INTERVAL '30 days') AS views_30d
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute stats for taman_kehati {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    pub async fn create(
        &self,
        dto: CreateTamanKehatiDto,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<TamanKehati> {
        let values = TamanKehatiWrite::from(dto);
        let batas_area = values.batas_area.as_ref().map(|g| g.to_string());

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO taman_kehati (
                kode, nama_resmi, alamat, luas, tipe_taman, tanggal_penetapan, deskripsi,
                provinsi_id, kabupaten_kota_id, kecamatan_id, desa_id,
                latitude, longitude, koordinat, batas_area, status, created_by, updated_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, ST_SetSRID(ST_MakePoint($13::float8, $12::float8), 4326),
                ST_SetSRID(ST_GeomFromGeoJSON($14::text), 4326), $15, $16, $16
            )
            RETURNING id
            "#,
        )
        .bind(&values.kode)
        .bind(&values.nama_resmi)
        .bind(&values.alamat)
        .bind(values.luas)
        .bind(values.tipe_taman)
        .bind(values.tanggal_penetapan)
        .bind(&values.deskripsi)
        .bind(values.provinsi_id)
        .bind(values.kabupaten_kota_id)
        .bind(values.kecamatan_id)
        .bind(values.desa_id)
        .bind(values.latitude)
        .bind(values.longitude)
        .bind(batas_area)
        .bind(values.status)
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, "Taman Kehati with this kode already exists"))?;

        let created = Self::fetch(&mut tx, id, false).await?;
        AuditService::record(
            &mut tx,
            AuditEntry::created(user.user_id, TABLE_NAME, id, snapshot(&created), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created taman_kehati {} '{}'", id, created.nama_resmi);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        dto: UpdateTamanKehatiDto,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<TamanKehati> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        user.ensure_taman_access(id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        let values = dto.merge(&current)?;
        let batas_area = values.batas_area.as_ref().map(|g| g.to_string());

        sqlx::query(
            r#"
            UPDATE taman_kehati SET
                kode = $2, nama_resmi = $3, alamat = $4, luas = $5, tipe_taman = $6,
                tanggal_penetapan = $7, deskripsi = $8, provinsi_id = $9,
                kabupaten_kota_id = $10, kecamatan_id = $11, desa_id = $12,
                latitude = $13, longitude = $14,
                koordinat = ST_SetSRID(ST_MakePoint($14::float8, $13::float8), 4326),
                batas_area = COALESCE(ST_SetSRID(ST_GeomFromGeoJSON($15::text), 4326), batas_area),
                status = $16, updated_by = $17, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&values.kode)
        .bind(&values.nama_resmi)
        .bind(&values.alamat)
        .bind(values.luas)
        .bind(values.tipe_taman)
        .bind(values.tanggal_penetapan)
        .bind(&values.deskripsi)
        .bind(values.provinsi_id)
        .bind(values.kabupaten_kota_id)
        .bind(values.kecamatan_id)
        .bind(values.desa_id)
        .bind(values.latitude)
        .bind(values.longitude)
        .bind(batas_area)
        .bind(values.status)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, "Taman Kehati with this kode already exists"))?;

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

        tracing::info!("Updated taman_kehati {}", id);
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
        user.ensure_taman_access(id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        sqlx::query("DELETE FROM taman_kehati WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_delete_error(e, "Taman Kehati"))?;

        AuditService::record(
            &mut tx,
            AuditEntry::deleted(user.user_id, TABLE_NAME, id, snapshot(&current), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Deleted taman_kehati {}", id);
        Ok(())
    }
}
