use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::regions::models::{Region, RegionLevel};

/// Service for Indonesian administrative region lookups
pub struct RegionService {
    pool: PgPool,
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()))
}

impl RegionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all provinces with optional search
    pub async fn list_provinsi(&self, search: Option<&str>) -> Result<Vec<Region>> {
        let level = RegionLevel::Provinsi;
        let regions = match search_pattern(search) {
            Some(pattern) => {
                let sql = format!(
                    "{} WHERE LOWER(nama) LIKE $1 OR kode LIKE $1 ORDER BY kode ASC",
                    level.select_sql()
                );
                sqlx::query_as::<_, Region>(&sql)
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{} ORDER BY kode ASC", level.select_sql());
                sqlx::query_as::<_, Region>(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to fetch provinsi: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(regions)
    }

    /// Get a region of the given level by its code
    pub async fn get_by_code(&self, level: RegionLevel, kode: &str) -> Result<Region> {
        let sql = format!("{} WHERE kode = $1", level.select_sql());

        sqlx::query_as::<_, Region>(&sql)
            .bind(kode)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} by code {}: {:?}", level.table(), kode, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} with code '{}' not found", level.label(), kode))
            })
    }

    /// List the direct children of a region, e.g. kabupaten/kota of a provinsi
    pub async fn list_children(
        &self,
        parent_level: RegionLevel,
        parent_kode: &str,
        search: Option<&str>,
    ) -> Result<Vec<Region>> {
        let (child, parent_column) = parent_level
            .child()
            .and_then(|c| c.parent_column().map(|col| (c, col)))
            .ok_or_else(|| {
                AppError::BadRequest(format!("{} has no sub-regions", parent_level.label()))
            })?;

        // Verify the parent exists so an unknown code is a 404 rather than an empty list
        let parent = self.get_by_code(parent_level, parent_kode).await?;

        let regions = match search_pattern(search) {
            Some(pattern) => {
                let sql = format!(
                    "{} WHERE {} = $1 AND (LOWER(nama) LIKE $2 OR kode LIKE $2) ORDER BY kode ASC",
                    child.select_sql(),
                    parent_column
                );
                sqlx::query_as::<_, Region>(&sql)
                    .bind(parent.id)
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "{} WHERE {} = $1 ORDER BY kode ASC",
                    child.select_sql(),
                    parent_column
                );
                sqlx::query_as::<_, Region>(&sql)
                    .bind(parent.id)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!(
                "Failed to fetch {} for {} {}: {:?}",
                child.table(),
                parent_level.table(),
                parent_kode,
                e
            );
            AppError::Database(e)
        })?;

        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(Some("Jawa")), Some("%jawa%".to_string()));
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(None), None);
    }
}
