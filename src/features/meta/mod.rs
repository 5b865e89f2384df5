//! Enum value lists for client dropdowns.

pub mod dto;
pub mod handler;
pub mod routes;
