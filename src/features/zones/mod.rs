//! Zones (zona taman): named polygon areas inside a Taman Kehati.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ZoneService;
