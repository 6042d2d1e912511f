//! Client domain - local cache entries, modes and the transport seam

mod entity;
mod transport;

pub use entity::*;
pub use transport::*;
