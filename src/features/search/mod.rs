//! Full-text search across gardens, collections and articles, plus the
//! global name autocomplete.
//!
//! Results carry titles and snippets only, never coordinates, so nothing here
//! goes through the masking policy. Non-admin callers only see published rows.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SearchService;
