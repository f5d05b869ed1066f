//! Storage backends for kurso.
//!
//! `JsonFileStore` persists the session to per-entity JSON files under the
//! platform config dir; `MemoryStore` keeps everything in process memory.
//! Both implement `kurso_core::store::CourseStore`.

pub mod atomic_json;
pub mod json_store;
pub mod memory_store;
pub mod paths;

pub use atomic_json::AtomicJsonFile;
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use paths::KursoPaths;
