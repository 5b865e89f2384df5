mod artikel_handler;

pub use artikel_handler::*;
