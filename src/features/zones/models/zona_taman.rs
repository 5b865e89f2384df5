use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::shared::etag::Versioned;

pub const TABLE_NAME: &str = "zona_taman";

pub const SELECT_COLUMNS: &str = r#"
    z.id, z.taman_kehati_id, z.kode_zona, z.nama_zona, z.deskripsi, z.luas,
    ST_AsGeoJSON(z.poligon)::jsonb AS poligon, z.warna, z.created_at, z.updated_at
"#;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ZonaTaman {
    pub id: i32,
    pub taman_kehati_id: i32,
    pub kode_zona: String,
    pub nama_zona: Option<String>,
    pub deskripsi: Option<String>,
    pub luas: Option<Decimal>,
    pub poligon: Option<serde_json::Value>,
    pub warna: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Versioned for ZonaTaman {
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}
