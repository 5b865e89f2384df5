mod koleksi_tumbuhan;

pub use koleksi_tumbuhan::*;
