//! Catalog infrastructure - image id mapping and image bytes

mod filesystem;
mod in_memory;
mod index;

pub use filesystem::FileSystemCatalog;
pub use in_memory::InMemoryCatalog;
pub use index::CategoryIndex;
