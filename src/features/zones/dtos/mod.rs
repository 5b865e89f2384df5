mod zona_dto;

pub use zona_dto::*;
