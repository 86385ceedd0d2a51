pub mod duration;
pub mod summary;
