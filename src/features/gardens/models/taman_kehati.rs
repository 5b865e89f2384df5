use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::enums::{StatusPublikasi, TipeTaman};
use crate::shared::etag::Versioned;

pub const TABLE_NAME: &str = "taman_kehati";

/// Columns selected for a garden row. Coordinates come back as float8 and the
/// boundary as GeoJSON.
pub const SELECT_COLUMNS: &str = r#"
    t.id, t.kode, t.nama_resmi, t.alamat, t.luas, t.tipe_taman, t.tanggal_penetapan,
    t.deskripsi, t.provinsi_id, t.kabupaten_kota_id, t.kecamatan_id, t.desa_id,
    t.latitude::float8 AS latitude, t.longitude::float8 AS longitude,
    ST_AsGeoJSON(t.batas_area)::jsonb AS batas_area,
    t.status, t.created_by, t.updated_by, t.created_at, t.updated_at
"#;

/// A Taman Kehati as stored, with true coordinates
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TamanKehati {
    pub id: i32,
    pub kode: Option<String>,
    pub nama_resmi: String,
    pub alamat: String,
    pub luas: Option<Decimal>,
    pub tipe_taman: TipeTaman,
    pub tanggal_penetapan: Option<NaiveDate>,
    pub deskripsi: Option<String>,
    pub provinsi_id: i32,
    pub kabupaten_kota_id: i32,
    pub kecamatan_id: Option<i32>,
    pub desa_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub batas_area: Option<serde_json::Value>,
    pub status: StatusPublikasi,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Versioned for TamanKehati {
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NearbyTaman {
    #[sqlx(flatten)]
    pub taman: TamanKehati,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct TamanStats {
    pub koleksi_count: i64,
    pub artikel_count: i64,
    pub views_7d: i64,
    pub views_30d: i64,
}
