use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::enums::{MediaCategory, MediaType};

pub const TABLE_NAME: &str = "media";

pub const SELECT_COLUMNS: &str = r#"
    m.id, m.taman_kehati_id, m.koleksi_tumbuhan_id, m.media_type, m.media_category,
    m.file_name, m.file_path, m.file_size, m.mime_type, m.caption, m.is_main_image,
    m.uploaded_by, m.created_at
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Media {
    pub id: i32,
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    pub media_type: MediaType,
    pub media_category: MediaCategory,
    /// Name of the file as uploaded
    pub file_name: String,
    /// Object storage key
    pub file_path: String,
    pub file_size: Option<i32>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub is_main_image: bool,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
