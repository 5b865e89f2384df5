mod garden_handler;

pub use garden_handler::*;
