//! Plant collections (koleksi tumbuhan) held by a Taman Kehati.
//!
//! Besides CRUD this feature serves name suggestions, grouped statistics,
//! map points and the GeoJSON / Darwin Core exports. Garden (`*_taman`) and
//! origin (`*_asal`) coordinates are both masked for non-admin callers.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CollectionService;
