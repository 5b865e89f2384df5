mod export_handler;
mod koleksi_handler;

pub use export_handler::*;
pub use koleksi_handler::*;
