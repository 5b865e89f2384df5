pub mod articles;
pub mod audit;
pub mod auth;
pub mod collections;
pub mod gardens;
pub mod media;
pub mod meta;
pub mod regions;
pub mod search;
pub mod views;
pub mod zones;
