use sqlx::{PgConnection, PgPool};

use crate::core::error::{handle_db_error, handle_delete_error, AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::{snapshot, AuditEntry, AuditService};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::zones::dtos::{CreateZonaDto, UpdateZonaDto, ZonaWrite};
use crate::features::zones::models::{ZonaTaman, SELECT_COLUMNS, TABLE_NAME};
use crate::shared::etag::{check_precondition, generate_etag};

const DUPLICATE_CODE: &str = "Zone with this kode_zona already exists in the garden";

pub struct ZoneService {
    pool: PgPool,
}

impl ZoneService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(conn: &mut PgConnection, id: i32, for_update: bool) -> Result<ZonaTaman> {
        let sql = format!(
            "SELECT {} FROM zona_taman z WHERE z.id = $1{}",
            SELECT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        sqlx::query_as::<_, ZonaTaman>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch zona_taman {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Zona {} not found", id)))
    }

    pub async fn list(&self, taman_kehati_id: Option<i32>) -> Result<Vec<ZonaTaman>> {
        let sql = format!(
            r#"
            SELECT {} FROM zona_taman z
            WHERE ($1::int4 IS NULL OR z.taman_kehati_id = $1)
            ORDER BY z.taman_kehati_id ASC, z.kode_zona ASC
            "#,
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, ZonaTaman>(&sql)
            .bind(taman_kehati_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list zona_taman: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get(&self, id: i32) -> Result<ZonaTaman> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        Self::fetch(&mut conn, id, false).await
    }

    /// Insert one zone and its audit row inside the caller's transaction
    async fn insert(
        conn: &mut PgConnection,
        values: ZonaWrite,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<ZonaTaman> {
        let poligon = values.poligon.as_ref().map(|g| g.to_string());

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO zona_taman (taman_kehati_id, kode_zona, nama_zona, deskripsi, luas, poligon, warna)
            VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_GeomFromGeoJSON($6::text), 4326), $7)
            RETURNING id
            "#,
        )
        .bind(values.taman_kehati_id)
        .bind(&values.kode_zona)
        .bind(&values.nama_zona)
        .bind(&values.deskripsi)
        .bind(values.luas)
        .bind(poligon)
        .bind(&values.warna)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_CODE))?;

        let created = Self::fetch(&mut *conn, id, false).await?;
        AuditService::record(
            conn,
            AuditEntry::created(user.user_id, TABLE_NAME, id, snapshot(&created), client),
        )
        .await?;
        Ok(created)
    }

    pub async fn create(
        &self,
        dto: CreateZonaDto,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<ZonaTaman> {
        user.ensure_taman_access(dto.taman_kehati_id)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = Self::insert(&mut tx, ZonaWrite::from(dto), user, client).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Created zona_taman {} in taman_kehati {}",
            created.id,
            created.taman_kehati_id
        );
        Ok(created)
    }

    /// Create every imported zone in one transaction; nothing is kept if any insert fails
    pub async fn import(
        &self,
        taman_kehati_id: i32,
        zones: Vec<CreateZonaDto>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<Vec<ZonaTaman>> {
        user.ensure_taman_access(taman_kehati_id)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut created = Vec::with_capacity(zones.len());
        for dto in zones {
            created.push(Self::insert(&mut tx, ZonaWrite::from(dto), user, client).await?);
        }
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Imported {} zones into taman_kehati {}",
            created.len(),
            taman_kehati_id
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        dto: UpdateZonaDto,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<ZonaTaman> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        user.ensure_taman_access(current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        let values = dto.merge(&current);
        // Moving a zone needs access to the destination garden as well
        user.ensure_taman_access(values.taman_kehati_id)?;
        let poligon = values.poligon.as_ref().map(|g| g.to_string());

        sqlx::query(
            r#"
            UPDATE zona_taman SET
                taman_kehati_id = $2, kode_zona = $3, nama_zona = $4, deskripsi = $5, luas = $6,
                poligon = COALESCE(ST_SetSRID(ST_GeomFromGeoJSON($7::text), 4326), poligon),
                warna = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(values.taman_kehati_id)
        .bind(&values.kode_zona)
        .bind(&values.nama_zona)
        .bind(&values.deskripsi)
        .bind(values.luas)
        .bind(poligon)
        .bind(&values.warna)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_CODE))?;

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

        tracing::info!("Updated zona_taman {}", id);
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
        user.ensure_taman_access(current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        sqlx::query("DELETE FROM zona_taman WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_delete_error(e, "Zona"))?;

        AuditService::record(
            &mut tx,
            AuditEntry::deleted(user.user_id, TABLE_NAME, id, snapshot(&current), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Deleted zona_taman {}", id);
        Ok(())
    }
}
