//! Key-value store adapters.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileKvStore;
pub use memory::MemoryKvStore;
