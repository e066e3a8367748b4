pub mod store;

pub use store::{FileLayoutStore, LayoutStore, MemoryLayoutStore};
