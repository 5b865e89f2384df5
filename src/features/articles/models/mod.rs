mod artikel;

pub use artikel::*;
