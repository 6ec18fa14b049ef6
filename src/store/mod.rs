//! Shared state reused across codec calls

mod type_cache;

pub use type_cache::TypeCache;
