mod media;

pub use media::*;
