use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::MaybeUser;
use crate::features::search::dtos::{
    merge_suggestions, SearchQuery, SearchResponseDto, SearchSuggestQuery,
};
use crate::features::search::services::SearchService;
use crate::shared::constants::MIN_SUGGEST_QUERY_LEN;
use crate::shared::types::ApiResponse;

/// Full-text search across gardens, collections and articles
///
/// Queries shorter than two characters return no results. Non-admins only
/// see published records.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Hits ranked by relevance", body = ApiResponse<SearchResponseDto>),
        (status = 400, description = "Unknown entity")
    ),
    tag = "search"
)]
pub async fn search(
    caller: MaybeUser,
    State(service): State<Arc<SearchService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResponseDto>>> {
    let rows = match query.terms() {
        Some(terms) => {
            let is_admin = caller.role().is_some_and(|r| r.is_admin());
            service
                .search(terms, query.entity, is_admin, query.limit())
                .await?
        }
        None => Vec::new(),
    };

    let response = SearchResponseDto::new(&query, rows);
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Garden and collection name autocomplete
#[utoipa::path(
    get,
    path = "/api/search/suggest",
    params(SearchSuggestQuery),
    responses(
        (status = 200, description = "Up to ten distinct names", body = ApiResponse<Vec<String>>)
    ),
    tag = "search"
)]
pub async fn suggest(
    caller: MaybeUser,
    State(service): State<Arc<SearchService>>,
    Query(query): Query<SearchSuggestQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let terms = query.q.trim();
    if terms.chars().count() < MIN_SUGGEST_QUERY_LEN {
        return Ok(Json(ApiResponse::success(Some(Vec::new()), None, None)));
    }

    let is_admin = caller.role().is_some_and(|r| r.is_admin());
    let (taman, koleksi) = service.suggest(terms, is_admin).await?;
    Ok(Json(ApiResponse::success(
        Some(merge_suggestions(taman, koleksi)),
        None,
        None,
    )))
}
