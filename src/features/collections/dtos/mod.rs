mod export_dto;
mod koleksi_dto;

pub use export_dto::*;
pub use koleksi_dto::*;
