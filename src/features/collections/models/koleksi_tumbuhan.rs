use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::enums::{StatusEndemik, StatusPublikasi};
use crate::shared::etag::Versioned;

pub const TABLE_NAME: &str = "koleksi_tumbuhan";

pub const SELECT_COLUMNS: &str = r#"
    k.id, k.nomor_koleksi,
    k.nama_lokal_daerah, k.nama_umum_nasional, k.nama_ilmiah, k.genus, k.spesies, k.author,
    k.sumber_publikasi,
    k.bentuk_pohon, k.bentuk_daun, k.bentuk_bunga, k.bentuk_buah, k.waktu_berbunga, k.waktu_berbuah,
    k.taman_kehati_id, k.zona_id,
    k.latitude_taman::float8 AS latitude_taman, k.longitude_taman::float8 AS longitude_taman,
    k.ketinggian_taman,
    k.asal_kampung, k.asal_desa_id, k.asal_kecamatan_id, k.asal_kabupaten_id, k.asal_provinsi_id,
    k.latitude_asal::float8 AS latitude_asal, k.longitude_asal::float8 AS longitude_asal,
    k.ketinggian_asal,
    k.sebaran_global, k.referensi_sebaran, k.status_endemik, k.habitat_alami, k.referensi_habitat,
    k.metode_perbanyakan, k.manfaat_masyarakat, k.manfaat_lingkungan, k.potensi_pengembangan,
    k.tanggal_pengumpulan, k.tanggal_penanaman,
    k.status, k.created_by, k.updated_by, k.created_at, k.updated_at
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct KoleksiTumbuhan {
    pub id: i32,
    pub nomor_koleksi: Option<String>,

    pub nama_lokal_daerah: Option<String>,
    pub nama_umum_nasional: Option<String>,
    pub nama_ilmiah: String,
    pub genus: Option<String>,
    pub spesies: Option<String>,
    pub author: Option<String>,
    pub sumber_publikasi: Option<String>,

    pub bentuk_pohon: Option<String>,
    pub bentuk_daun: Option<String>,
    pub bentuk_bunga: Option<String>,
    pub bentuk_buah: Option<String>,
    pub waktu_berbunga: Option<String>,
    pub waktu_berbuah: Option<String>,

    pub taman_kehati_id: i32,
    pub zona_id: Option<i32>,
    pub latitude_taman: Option<f64>,
    pub longitude_taman: Option<f64>,
    /// Meters above sea level
    pub ketinggian_taman: Option<i32>,

    pub asal_kampung: Option<String>,
    pub asal_desa_id: Option<i32>,
    pub asal_kecamatan_id: Option<i32>,
    pub asal_kabupaten_id: Option<i32>,
    pub asal_provinsi_id: Option<i32>,
    pub latitude_asal: Option<f64>,
    pub longitude_asal: Option<f64>,
    pub ketinggian_asal: Option<i32>,

    pub sebaran_global: Option<String>,
    pub referensi_sebaran: Option<String>,
    pub status_endemik: StatusEndemik,
    pub habitat_alami: Option<String>,
    pub referensi_habitat: Option<String>,

    pub metode_perbanyakan: Option<String>,
    pub manfaat_masyarakat: Option<String>,
    pub manfaat_lingkungan: Option<String>,
    pub potensi_pengembangan: Option<String>,

    pub tanggal_pengumpulan: Option<NaiveDate>,
    pub tanggal_penanaman: Option<NaiveDate>,

    pub status: StatusPublikasi,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Versioned for KoleksiTumbuhan {
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

/// Minimal row for map rendering
#[derive(Debug, Clone, FromRow)]
pub struct KoleksiMapPoint {
    pub id: i32,
    pub nama_ilmiah: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status_endemik: StatusEndemik,
}

/// Columns collections may be grouped by for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatsGroupBy {
    StatusEndemik,
    Genus,
    TamanKehatiId,
}

impl StatsGroupBy {
    /// Grouping expression, cast to text so every variant yields the same row shape
    pub fn column_sql(&self) -> &'static str {
        match self {
            StatsGroupBy::StatusEndemik => "k.status_endemik::text",
            StatsGroupBy::Genus => "k.genus",
            StatsGroupBy::TamanKehatiId => "k.taman_kehati_id::text",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StatsGroupRow {
    pub group_value: Option<String>,
    pub count: i64,
}

/// Collection row with origin region names, used by the exports
#[derive(Debug, Clone, FromRow)]
pub struct KoleksiExportRow {
    #[sqlx(flatten)]
    pub koleksi: KoleksiTumbuhan,
    pub asal_pulau: Option<String>,
    pub asal_provinsi_nama: Option<String>,
    pub asal_kabupaten_nama: Option<String>,
    pub asal_kecamatan_nama: Option<String>,
    pub asal_desa_nama: Option<String>,
}

/// Published article headline listed next to a collection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RelatedArtikel {
    pub id: i32,
    pub judul: String,
    pub slug: String,
    pub ringkasan: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
