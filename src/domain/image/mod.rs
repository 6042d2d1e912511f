//! Image domain - identities, categories and the catalog they live in

mod entity;
mod repository;

pub use entity::*;
pub use repository::*;
