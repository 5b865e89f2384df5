//! Adapters for external infrastructure used by the features

pub mod storage;
