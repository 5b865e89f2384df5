use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::AppError;
use crate::features::articles::models::Artikel;
use crate::shared::enums::StatusPublikasi;

pub const DEFAULT_RELATED_LIMIT: i64 = 5;
pub const MAX_RELATED_LIMIT: i64 = 20;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ArtikelListQuery {
    /// Search in title, summary and content
    pub q: Option<String>,
    /// Non-admin callers may only ask for `published`
    pub status: Option<StatusPublikasi>,
    pub taman_kehati_id: Option<i32>,
    pub kategori: Option<String>,
}

impl ArtikelListQuery {
    /// Status filter actually applied for a caller
    pub fn effective_status(&self, is_admin: bool) -> Result<Option<StatusPublikasi>, AppError> {
        if is_admin {
            return Ok(self.status);
        }
        match self.status {
            None | Some(StatusPublikasi::Published) => Ok(Some(StatusPublikasi::Published)),
            Some(_) => Err(AppError::Forbidden(
                "Only published articles are available".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RelatedQuery {
    /// Maximum related articles (default 5, max 20)
    pub limit: Option<i64>,
}

impl RelatedQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_RELATED_LIMIT)
            .clamp(1, MAX_RELATED_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateArtikelDto {
    #[validate(length(min = 1, max = 255, message = "Judul must be 1-255 characters"))]
    pub judul: String,
    pub ringkasan: Option<String>,
    #[validate(length(min = 1, message = "Konten is required"))]
    pub konten: String,
    pub cover_image_id: Option<i32>,
    pub taman_kehati_id: Option<i32>,
    #[validate(length(max = 50, message = "Kategori must be at most 50 characters"))]
    pub kategori: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub status: StatusPublikasi,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateArtikelDto {
    #[validate(length(min = 1, max = 255, message = "Judul must be 1-255 characters"))]
    pub judul: Option<String>,
    pub ringkasan: Option<String>,
    #[validate(length(min = 1, message = "Konten cannot be empty"))]
    pub konten: Option<String>,
    pub cover_image_id: Option<i32>,
    pub taman_kehati_id: Option<i32>,
    #[validate(length(max = 50, message = "Kategori must be at most 50 characters"))]
    pub kategori: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<StatusPublikasi>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetCoverDto {
    pub cover_image_id: i32,
}

/// Column values written by insert and update
#[derive(Debug, Clone)]
pub struct ArtikelWrite {
    pub judul: String,
    pub ringkasan: Option<String>,
    pub konten: String,
    pub cover_image_id: Option<i32>,
    pub taman_kehati_id: Option<i32>,
    pub kategori: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: StatusPublikasi,
}

impl From<CreateArtikelDto> for ArtikelWrite {
    fn from(dto: CreateArtikelDto) -> Self {
        Self {
            judul: dto.judul,
            ringkasan: dto.ringkasan,
            konten: dto.konten,
            cover_image_id: dto.cover_image_id,
            taman_kehati_id: dto.taman_kehati_id,
            kategori: dto.kategori,
            tags: dto.tags,
            status: dto.status,
        }
    }
}

impl UpdateArtikelDto {
    pub fn merge(self, current: &Artikel) -> ArtikelWrite {
        ArtikelWrite {
            judul: self.judul.unwrap_or_else(|| current.judul.clone()),
            ringkasan: self.ringkasan.or_else(|| current.ringkasan.clone()),
            konten: self.konten.unwrap_or_else(|| current.konten.clone()),
            cover_image_id: self.cover_image_id.or(current.cover_image_id),
            taman_kehati_id: self.taman_kehati_id.or(current.taman_kehati_id),
            kategori: self.kategori.or_else(|| current.kategori.clone()),
            tags: self
                .tags
                .or_else(|| current.tags.as_ref().map(|t| t.0.clone())),
            status: self.status.unwrap_or(current.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn artikel() -> Artikel {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        Artikel {
            id: 1,
            judul: "Keunikan Flora di Taman Kehati".to_string(),
            slug: "keunikan-flora-di-taman-kehati".to_string(),
            ringkasan: None,
            konten: "Isi artikel".to_string(),
            cover_image_id: Some(5),
            taman_kehati_id: Some(1),
            kategori: Some("Flora".to_string()),
            tags: Some(Json(vec!["flora".to_string(), "konservasi".to_string()])),
            status: StatusPublikasi::Draft,
            published_at: None,
            author_id: Uuid::now_v7(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_non_admin_sees_published_only() {
        let query = ArtikelListQuery::default();
        assert_eq!(
            query.effective_status(false).unwrap(),
            Some(StatusPublikasi::Published)
        );
        assert_eq!(query.effective_status(true).unwrap(), None);

        let drafts = ArtikelListQuery {
            status: Some(StatusPublikasi::Draft),
            ..Default::default()
        };
        assert!(matches!(
            drafts.effective_status(false),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(
            drafts.effective_status(true).unwrap(),
            Some(StatusPublikasi::Draft)
        );
    }

    #[test]
    fn test_merge_keeps_tags_and_status() {
        let update = UpdateArtikelDto {
            judul: Some("Flora Endemik Sumatera".to_string()),
            ..Default::default()
        };
        let merged = update.merge(&artikel());
        assert_eq!(merged.judul, "Flora Endemik Sumatera");
        assert_eq!(merged.tags.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(merged.status, StatusPublikasi::Draft);
        assert_eq!(merged.cover_image_id, Some(5));
    }

    #[test]
    fn test_tags_serialize_as_plain_array() {
        let value = serde_json::to_value(artikel()).unwrap();
        assert_eq!(value["tags"], serde_json::json!(["flora", "konservasi"]));
    }

    #[test]
    fn test_related_limit() {
        assert_eq!(RelatedQuery { limit: None }.limit(), DEFAULT_RELATED_LIMIT);
        assert_eq!(RelatedQuery { limit: Some(500) }.limit(), MAX_RELATED_LIMIT);
    }

    #[test]
    fn test_create_validation() {
        let dto = CreateArtikelDto {
            judul: "Judul".to_string(),
            konten: String::new(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
