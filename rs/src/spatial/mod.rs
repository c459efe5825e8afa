pub mod encoding;
pub mod geometry;
pub mod index;
pub mod simplify;
