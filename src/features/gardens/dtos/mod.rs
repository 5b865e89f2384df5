mod taman_kehati_dto;

pub use taman_kehati_dto::*;
