//! News and education articles (artikel), optionally tied to one garden.
//!
//! Non-admin callers only ever see published articles.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ArticleService;
