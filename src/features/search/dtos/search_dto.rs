use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::search::models::SearchRow;
use crate::shared::constants::{
    DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, MAX_SUGGESTIONS, MIN_SUGGEST_QUERY_LEN,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchEntity {
    #[default]
    All,
    Taman,
    Koleksi,
    Artikel,
}

impl SearchEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEntity::All => "all",
            SearchEntity::Taman => "taman",
            SearchEntity::Koleksi => "koleksi",
            SearchEntity::Artikel => "artikel",
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Web-search syntax: quoted phrases, `or`, `-excluded`
    pub q: String,
    #[serde(default)]
    pub entity: SearchEntity,
    /// Default 20, max 100
    pub limit: Option<i64>,
}

impl SearchQuery {
    /// Trimmed query, `None` when too short to search
    pub fn terms(&self) -> Option<&str> {
        let q = self.q.trim();
        (q.chars().count() >= MIN_SUGGEST_QUERY_LEN).then_some(q)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchSuggestQuery {
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResultDto {
    pub id: i32,
    pub entity_type: SearchEntity,
    pub title: String,
    /// Article slug, for building links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Matching fragment with hits wrapped in `<b>`
    pub snippet: Option<String>,
    pub score: f64,
}

impl From<SearchRow> for SearchResultDto {
    fn from(row: SearchRow) -> Self {
        let entity_type = match row.entity_type.as_str() {
            "taman" => SearchEntity::Taman,
            "koleksi" => SearchEntity::Koleksi,
            _ => SearchEntity::Artikel,
        };
        Self {
            id: row.id,
            entity_type,
            title: row.title,
            slug: row.slug,
            snippet: row.snippet.filter(|s| !s.trim().is_empty()),
            score: row.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponseDto {
    pub query: String,
    pub entity: SearchEntity,
    pub total: usize,
    pub results: Vec<SearchResultDto>,
}

impl SearchResponseDto {
    pub fn new(query: &SearchQuery, rows: Vec<SearchRow>) -> Self {
        let results: Vec<SearchResultDto> = rows.into_iter().map(Into::into).collect();
        Self {
            query: query.q.clone(),
            entity: query.entity,
            total: results.len(),
            results,
        }
    }
}

/// Garden names first, then collection names; duplicates dropped, order kept
pub fn merge_suggestions(taman: Vec<String>, koleksi: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for name in taman.into_iter().chain(koleksi) {
        if !merged.contains(&name) {
            merged.push(name);
        }
    }
    merged.truncate(MAX_SUGGESTIONS as usize);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: &str) -> SearchQuery {
        SearchQuery {
            q: q.to_string(),
            entity: SearchEntity::All,
            limit: None,
        }
    }

    fn row(id: i32, entity_type: &str, snippet: Option<&str>) -> SearchRow {
        SearchRow {
            id,
            entity_type: entity_type.to_string(),
            title: format!("Hasil {}", id),
            slug: None,
            snippet: snippet.map(str::to_string),
            score: 0.5,
        }
    }

    #[test]
    fn test_terms_requires_two_characters() {
        assert_eq!(query("b").terms(), None);
        assert_eq!(query("  b ").terms(), None);
        assert_eq!(query(" bambu ").terms(), Some("bambu"));
    }

    #[test]
    fn test_limit_is_clamped() {
        let mut q = query("bambu");
        assert_eq!(q.limit(), DEFAULT_SEARCH_LIMIT);
        q.limit = Some(0);
        assert_eq!(q.limit(), 1);
        q.limit = Some(10_000);
        assert_eq!(q.limit(), MAX_SEARCH_LIMIT);
    }

    #[test]
    fn test_entity_parses_lowercase() {
        let entity: SearchEntity = serde_json::from_value(serde_json::json!("koleksi")).unwrap();
        assert_eq!(entity, SearchEntity::Koleksi);
        assert!(serde_json::from_value::<SearchEntity>(serde_json::json!("zona")).is_err());
    }

    #[test]
    fn test_response_maps_rows() {
        let rows = vec![
            row(1, "koleksi", Some("<b>bambu</b> tali")),
            row(5, "taman", Some("   ")),
            row(9, "artikel", None),
        ];
        let response = SearchResponseDto::new(&query("bambu"), rows);
        assert_eq!(response.total, 3);
        assert_eq!(response.results[0].entity_type, SearchEntity::Koleksi);
        assert_eq!(response.results[1].entity_type, SearchEntity::Taman);
        assert!(response.results[1].snippet.is_none());
        assert_eq!(response.results[2].entity_type, SearchEntity::Artikel);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["entity"], "all");
        assert!(value["results"][0].get("slug").is_none());
    }

    #[test]
    fn test_merge_suggestions() {
        let merged = merge_suggestions(
            vec!["Taman Bambu".to_string(), "Kebun Raya".to_string()],
            vec!["Bambusa vulgaris".to_string(), "Taman Bambu".to_string()],
        );
        assert_eq!(merged, vec!["Taman Bambu", "Kebun Raya", "Bambusa vulgaris"]);

        let many = (0..20).map(|i| format!("Nama {}", i)).collect();
        assert_eq!(merge_suggestions(many, Vec::new()).len(), MAX_SUGGESTIONS as usize);
    }
}
