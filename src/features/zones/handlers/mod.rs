mod zona_handler;

pub use zona_handler::*;
