mod artikel_dto;

pub use artikel_dto::*;
