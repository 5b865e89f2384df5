mod collection_service;

pub use collection_service::*;
