use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::enums::StatusPublikasi;
use crate::shared::etag::Versioned;

pub const TABLE_NAME: &str = "artikel";

pub const SELECT_COLUMNS: &str = r#"
    a.id, a.judul, a.slug, a.ringkasan, a.konten, a.cover_image_id, a.taman_kehati_id,
    a.kategori, a.tags, a.status, a.published_at, a.author_id, a.created_at, a.updated_at
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Artikel {
    pub id: i32,
    pub judul: String,
    pub slug: String,
    pub ringkasan: Option<String>,
    pub konten: String,
    pub cover_image_id: Option<i32>,
    pub taman_kehati_id: Option<i32>,
    pub kategori: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<Json<Vec<String>>>,
    pub status: StatusPublikasi,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artikel {
    pub fn is_published(&self) -> bool {
        self.status == StatusPublikasi::Published
    }
}

impl Versioned for Artikel {
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}
