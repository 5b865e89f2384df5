use sqlx::FromRow;

/// One ranked hit from any searchable table
#[derive(Debug, Clone, FromRow)]
pub struct SearchRow {
    pub id: i32,
    /// `taman`, `koleksi` or `artikel`
    pub entity_type: String,
    pub title: String,
    pub slug: Option<String>,
    pub snippet: Option<String>,
    pub score: f64,
}
