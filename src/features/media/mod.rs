//! Photos and videos attached to a garden and/or a plant collection.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::MediaService;
