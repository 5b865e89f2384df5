mod taman_kehati;

pub use taman_kehati::*;
