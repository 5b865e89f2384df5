use std::sync::Arc;

use sqlx::{PgConnection, PgPool};

use crate::core::error::{handle_db_error, handle_delete_error, AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::audit::{snapshot, AuditEntry, AuditService};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::collections::dtos::{
    CreateKoleksiDto, ExportQuery, KoleksiListQuery, KoleksiWrite, MapPointsQuery,
    UpdateKoleksiDto, ZonaKoleksiQuery,
};
use crate::features::collections::models::{
    KoleksiExportRow, KoleksiMapPoint, KoleksiTumbuhan, RelatedArtikel, StatsGroupBy,
    StatsGroupRow, SELECT_COLUMNS, TABLE_NAME,
};
use crate::shared::constants::{MAX_RELATED, MAX_SUGGESTIONS, MIN_SUGGEST_QUERY_LEN};
use crate::shared::etag::{check_precondition, generate_etag};
use crate::shared::geo_masking::MaskingPolicy;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::escape_like;

const DUPLICATE_NOMOR: &str = "Koleksi with this nomor_koleksi already exists";

/// Service for plant collection records
pub struct CollectionService {
    pool: PgPool,
    masking: Arc<MaskingPolicy>,
}

fn like_pattern(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("%{}%", escape_like(v)))
}

impl CollectionService {
    pub fn new(pool: PgPool, masking: Arc<MaskingPolicy>) -> Self {
        Self { pool, masking }
    }

    pub fn masking(&self) -> &MaskingPolicy {
        &self.masking
    }

    pub(crate) async fn fetch(
        conn: &mut PgConnection,
        id: i32,
        for_update: bool,
    ) -> Result<KoleksiTumbuhan> {
        let sql = format!(
            "SELECT {} FROM koleksi_tumbuhan k WHERE k.id = $1{}",
            SELECT_COLUMNS,
            if for_update { " FOR UPDATE" } else { "" }
        );

        sqlx::query_as::<_, KoleksiTumbuhan>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch koleksi_tumbuhan {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Koleksi {} not found", id)))
    }

    pub async fn list(
        &self,
        query: &KoleksiListQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<KoleksiTumbuhan>, i64)> {
        let order_by = query.order_by()?;
        let q = like_pattern(query.q.as_deref());
        let genus = like_pattern(query.genus.as_deref());
        let spesies = like_pattern(query.spesies.as_deref());

        let filter = r#"
            WHERE ($1::text IS NULL
                   OR k.nama_ilmiah ILIKE $1 OR k.nama_umum_nasional ILIKE $1
                   OR k.nama_lokal_daerah ILIKE $1 OR k.bentuk_pohon ILIKE $1
                   OR k.bentuk_daun ILIKE $1)
              AND ($2::int4 IS NULL OR k.taman_kehati_id = $2)
              AND ($3::int4 IS NULL OR k.zona_id = $3)
              AND ($4::statuspublikasienum IS NULL OR k.status = $4)
              AND ($5::statusendemikenum IS NULL OR k.status_endemik = $5)
              AND ($6::text IS NULL OR k.genus ILIKE $6)
              AND ($7::text IS NULL OR k.spesies ILIKE $7)
        "#;

        let sql = format!(
            "SELECT {} FROM koleksi_tumbuhan k {} ORDER BY {} OFFSET $8 LIMIT $9",
            SELECT_COLUMNS, filter, order_by
        );
        let rows = sqlx::query_as::<_, KoleksiTumbuhan>(&sql)
            .bind(q.as_deref())
            .bind(query.taman_kehati_id)
            .bind(query.zona_id)
            .bind(query.status)
            .bind(query.status_endemik)
            .bind(genus.as_deref())
            .bind(spesies.as_deref())
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list koleksi_tumbuhan: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM koleksi_tumbuhan k {}", filter);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(q.as_deref())
            .bind(query.taman_kehati_id)
            .bind(query.zona_id)
            .bind(query.status)
            .bind(query.status_endemik)
            .bind(genus.as_deref())
            .bind(spesies.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count koleksi_tumbuhan: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    pub async fn get(&self, id: i32) -> Result<KoleksiTumbuhan> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        Self::fetch(&mut conn, id, false).await
    }

    /// Collections planted in one zone. 404 for unknown zones.
    pub async fn list_in_zona(
        &self,
        zona_id: i32,
        query: &ZonaKoleksiQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<KoleksiTumbuhan>, i64)> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM zona_taman WHERE id = $1)")
                .bind(zona_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up zona_taman {}: {:?}", zona_id, e);
                    AppError::Database(e)
                })?;
        if !exists {
            return Err(AppError::NotFound(format!("Zona {} not found", zona_id)));
        }

        let list_query = KoleksiListQuery {
            zona_id: Some(zona_id),
            status: query.status,
            ..Default::default()
        };
        self.list(&list_query, pagination).await
    }

    /// Published collections of the same genus or zone (same genus first) and
    /// published articles of the same garden or mentioning the scientific name
    pub async fn relations(
        &self,
        koleksi: &KoleksiTumbuhan,
    ) -> Result<(Vec<KoleksiTumbuhan>, Vec<RelatedArtikel>)> {
        let sql = format!(
            r#"
            SELECT {} FROM koleksi_tumbuhan k
            WHERE k.id <> $1
              AND k.status = 'published'
              AND ((k.genus IS NOT NULL AND k.genus = $2)
                   OR (k.zona_id IS NOT NULL AND k.zona_id = $3))
            ORDER BY (k.genus = $2) IS TRUE DESC, k.nama_ilmiah ASC, k.id ASC
            LIMIT $4
            "#,
            SELECT_COLUMNS
        );
        let terkait = sqlx::query_as::<_, KoleksiTumbuhan>(&sql)
            .bind(koleksi.id)
            .bind(koleksi.genus.as_deref())
            .bind(koleksi.zona_id)
            .bind(MAX_RELATED)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load related koleksi for {}: {:?}", koleksi.id, e);
                AppError::Database(e)
            })?;

        let artikel_terkait = sqlx::query_as::<_, RelatedArtikel>(
            r#"
            SELECT a.id, a.judul, a.slug, a.ringkasan, a.published_at
            FROM artikel a
            WHERE a.status = 'published'
              AND (a.taman_kehati_id = $1
                   OR a.judul ILIKE $2 OR a.konten ILIKE $2)
            ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id DESC
            LIMIT $3
            "#,
        )
        .bind(koleksi.taman_kehati_id)
        .bind(format!("%{}%", escape_like(&koleksi.nama_ilmiah)))
        .bind(MAX_RELATED)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load related artikel for koleksi {}: {:?}", koleksi.id, e);
            AppError::Database(e)
        })?;

        Ok((terkait, artikel_terkait))
    }

    /// Distinct scientific names starting with or containing `q`
    pub async fn suggest(&self, q: &str) -> Result<Vec<String>> {
        let q = q.trim();
        if q.chars().count() < MIN_SUGGEST_QUERY_LEN {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT nama_ilmiah
            FROM koleksi_tumbuhan
            WHERE nama_ilmiah ILIKE $1
            ORDER BY nama_ilmiah
            LIMIT $2
            "#,
        )
        .bind(format!("%{}%", q))
        .bind(MAX_SUGGESTIONS)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to suggest names for '{}': {:?}", q, e);
            AppError::Database(e)
        })
    }

    pub async fn stats(&self, group_by: StatsGroupBy) -> Result<Vec<StatsGroupRow>> {
        let sql = format!(
            r#"
            SELECT {col} AS group_value, COUNT(*) AS count
            FROM koleksi_tumbuhan k
            GROUP BY {col}
            ORDER BY count DESC, group_value ASC NULLS LAST
            "#,
            col = group_by.column_sql()
        );

        sqlx::query_as::<_, StatsGroupRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to compute koleksi stats by {:?}: {:?}", group_by, e);
                AppError::Database(e)
            })
    }

    /// Collections with garden coordinates, for map rendering
    pub async fn map_points(&self, query: &MapPointsQuery) -> Result<Vec<KoleksiMapPoint>> {
        sqlx::query_as::<_, KoleksiMapPoint>(
            r#"
            SELECT k.id, k.nama_ilmiah,
                   k.latitude_taman::float8 AS latitude,
                   k.longitude_taman::float8 AS longitude,
                   k.status_endemik
            FROM koleksi_tumbuhan k
            WHERE k.latitude_taman IS NOT NULL AND k.longitude_taman IS NOT NULL
              AND ($1::int4 IS NULL OR k.taman_kehati_id = $1)
              AND ($2::int4 IS NULL OR k.zona_id = $2)
            ORDER BY k.id
            "#,
        )
        .bind(query.taman_kehati_id)
        .bind(query.zona_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load koleksi map points: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Collections with their origin region names for Darwin Core and GeoJSON export
    pub async fn export(&self, query: &ExportQuery) -> Result<Vec<KoleksiExportRow>> {
        let sql = format!(
            r#"
            SELECT {},
                   p.pulau AS asal_pulau,
                   p.nama AS asal_provinsi_nama,
                   kk.nama AS asal_kabupaten_nama,
                   kc.nama AS asal_kecamatan_nama,
                   d.nama AS asal_desa_nama
            FROM koleksi_tumbuhan k
            LEFT JOIN provinsi p ON p.id = k.asal_provinsi_id
            LEFT JOIN kabupaten_kota kk ON kk.id = k.asal_kabupaten_id
            LEFT JOIN kecamatan kc ON kc.id = k.asal_kecamatan_id
            LEFT JOIN desa d ON d.id = k.asal_desa_id
            WHERE ($1::int4 IS NULL OR k.taman_kehati_id = $1)
              AND ($2::statuspublikasienum IS NULL OR k.status = $2)
            ORDER BY k.id
            OFFSET $3 LIMIT $4
            "#,
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, KoleksiExportRow>(&sql)
            .bind(query.taman_kehati_id)
            .bind(query.status)
            .bind(query.offset())
            .bind(query.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to export koleksi_tumbuhan: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn create(
        &self,
        dto: CreateKoleksiDto,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<KoleksiTumbuhan> {
        user.ensure_taman_access(dto.taman_kehati_id)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let id = Self::insert(&mut tx, &dto, user).await?;

        let created = Self::fetch(&mut tx, id, false).await?;
        AuditService::record(
            &mut tx,
            AuditEntry::created(user.user_id, TABLE_NAME, id, snapshot(&created), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created koleksi_tumbuhan {} '{}'", id, created.nama_ilmiah);
        Ok(created)
    }

    async fn insert(
        conn: &mut PgConnection,
        values: &KoleksiWrite,
        user: &AuthenticatedUser,
    ) -> Result<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO koleksi_tumbuhan (
                nomor_koleksi, nama_lokal_daerah, nama_umum_nasional, nama_ilmiah, genus, spesies,
                author, sumber_publikasi, bentuk_pohon, bentuk_daun, bentuk_bunga, bentuk_buah,
                waktu_berbunga, waktu_berbuah, taman_kehati_id, zona_id,
                latitude_taman, longitude_taman, ketinggian_taman,
                asal_kampung, asal_desa_id, asal_kecamatan_id, asal_kabupaten_id, asal_provinsi_id,
                latitude_asal, longitude_asal, ketinggian_asal,
                sebaran_global, referensi_sebaran, status_endemik, habitat_alami, referensi_habitat,
                metode_perbanyakan, manfaat_masyarakat, manfaat_lingkungan, potensi_pengembangan,
                tanggal_pengumpulan, tanggal_penanaman, status,
                koordinat_taman, koordinat_asal, created_by, updated_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27,
                $28, $29, $30, $31, $32, $33, $34, $35, $36, $37, $38, $39,
                ST_SetSRID(ST_MakePoint($18::float8, $17::float8), 4326),
                ST_SetSRID(ST_MakePoint($26::float8, $25::float8), 4326),
                $40, $40
            )
            RETURNING id
            "#,
        )
        .bind(&values.nomor_koleksi)
        .bind(&values.nama_lokal_daerah)
        .bind(&values.nama_umum_nasional)
        .bind(&values.nama_ilmiah)
        .bind(&values.genus)
        .bind(&values.spesies)
        .bind(&values.author)
        .bind(&values.sumber_publikasi)
        .bind(&values.bentuk_pohon)
        .bind(&values.bentuk_daun)
        .bind(&values.bentuk_bunga)
        .bind(&values.bentuk_buah)
        .bind(&values.waktu_berbunga)
        .bind(&values.waktu_berbuah)
        .bind(values.taman_kehati_id)
        .bind(values.zona_id)
        .bind(values.latitude_taman)
        .bind(values.longitude_taman)
        .bind(values.ketinggian_taman)
        .bind(&values.asal_kampung)
        .bind(values.asal_desa_id)
        .bind(values.asal_kecamatan_id)
        .bind(values.asal_kabupaten_id)
        .bind(values.asal_provinsi_id)
        .bind(values.latitude_asal)
        .bind(values.longitude_asal)
        .bind(values.ketinggian_asal)
        .bind(&values.sebaran_global)
        .bind(&values.referensi_sebaran)
        .bind(values.status_endemik)
        .bind(&values.habitat_alami)
        .bind(&values.referensi_habitat)
        .bind(&values.metode_perbanyakan)
        .bind(&values.manfaat_masyarakat)
        .bind(&values.manfaat_lingkungan)
        .bind(&values.potensi_pengembangan)
        .bind(values.tanggal_pengumpulan)
        .bind(values.tanggal_penanaman)
        .bind(values.status)
        .bind(user.user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_NOMOR))
    }

    pub async fn update(
        &self,
        id: i32,
        dto: UpdateKoleksiDto,
        if_match: Option<&str>,
        user: &AuthenticatedUser,
        client: &ClientInfo,
    ) -> Result<KoleksiTumbuhan> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = Self::fetch(&mut tx, id, true).await?;
        user.ensure_taman_access(current.taman_kehati_id)?;
        check_precondition(if_match, &generate_etag(&current))?;

        let values = dto.merge(&current)?;
        if values.taman_kehati_id != current.taman_kehati_id {
            user.ensure_taman_access(values.taman_kehati_id)?;
        }

        sqlx::query(
            r#"
            UPDATE koleksi_tumbuhan SET
                nomor_koleksi = $2, nama_lokal_daerah = $3, nama_umum_nasional = $4,
                nama_ilmiah = $5, genus = $6, spesies = $7, author = $8, sumber_publikasi = $9,
                bentuk_pohon = $10, bentuk_daun = $11, bentuk_bunga = $12, bentuk_buah = $13,
                waktu_berbunga = $14, waktu_berbuah = $15, taman_kehati_id = $16, zona_id = $17,
                latitude_taman = $18, longitude_taman = $19, ketinggian_taman = $20,
                asal_kampung = $21, asal_desa_id = $22, asal_kecamatan_id = $23,
                asal_kabupaten_id = $24, asal_provinsi_id = $25,
                latitude_asal = $26, longitude_asal = $27, ketinggian_asal = $28,
                sebaran_global = $29, referensi_sebaran = $30, status_endemik = $31,
                habitat_alami = $32, referensi_habitat = $33, metode_perbanyakan = $34,
                manfaat_masyarakat = $35, manfaat_lingkungan = $36, potensi_pengembangan = $37,
                tanggal_pengumpulan = $38, tanggal_penanaman = $39, status = $40,
                koordinat_taman = ST_SetSRID(ST_MakePoint($19::float8, $18::float8), 4326),
                koordinat_asal = ST_SetSRID(ST_MakePoint($27::float8, $26::float8), 4326),
                updated_by = $41, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&values.nomor_koleksi)
        .bind(&values.nama_lokal_daerah)
        .bind(&values.nama_umum_nasional)
        .bind(&values.nama_ilmiah)
        .bind(&values.genus)
        .bind(&values.spesies)
        .bind(&values.author)
        .bind(&values.sumber_publikasi)
        .bind(&values.bentuk_pohon)
        .bind(&values.bentuk_daun)
        .bind(&values.bentuk_bunga)
        .bind(&values.bentuk_buah)
        .bind(&values.waktu_berbunga)
        .bind(&values.waktu_berbuah)
        .bind(values.taman_kehati_id)
        .bind(values.zona_id)
        .bind(values.latitude_taman)
        .bind(values.longitude_taman)
        .bind(values.ketinggian_taman)
        .bind(&values.asal_kampung)
        .bind(values.asal_desa_id)
        .bind(values.asal_kecamatan_id)
        .bind(values.asal_kabupaten_id)
        .bind(values.asal_provinsi_id)
        .bind(values.latitude_asal)
        .bind(values.longitude_asal)
        .bind(values.ketinggian_asal)
        .bind(&values.sebaran_global)
        .bind(&values.referensi_sebaran)
        .bind(values.status_endemik)
        .bind(&values.habitat_alami)
        .bind(&values.referensi_habitat)
        .bind(&values.metode_perbanyakan)
        .bind(&values.manfaat_masyarakat)
        .bind(&values.manfaat_lingkungan)
        .bind(&values.potensi_pengembangan)
        .bind(values.tanggal_pengumpulan)
        .bind(values.tanggal_penanaman)
        .bind(values.status)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, DUPLICATE_NOMOR))?;

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

        tracing::info!("Updated koleksi_tumbuhan {}", id);
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

        sqlx::query("DELETE FROM koleksi_tumbuhan WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_delete_error(e, "Koleksi"))?;

        AuditService::record(
            &mut tx,
            AuditEntry::deleted(user.user_id, TABLE_NAME, id, snapshot(&current), client),
        )
        .await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Deleted koleksi_tumbuhan {}", id);
        Ok(())
    }
}
