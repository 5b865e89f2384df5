use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const TABLE_NAME: &str = "page_views";

/// One bucket of a view time series
#[derive(Debug, Clone, FromRow)]
pub struct SeriesRow {
    pub bucket: DateTime<Utc>,
    pub count: i64,
}

/// Most viewed entity with its display title, when the entity still exists
#[derive(Debug, Clone, FromRow)]
pub struct TopRow {
    pub id: i32,
    pub title: Option<String>,
    pub view_count: i64,
}
