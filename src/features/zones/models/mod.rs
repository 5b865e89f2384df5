mod zona_taman;

pub use zona_taman::*;
