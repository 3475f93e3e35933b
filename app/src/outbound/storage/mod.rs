//! Key-value store adapters.

mod atomic_io;
mod file_store;
mod memory;

pub use file_store::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
