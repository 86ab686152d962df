//! Local key-value storage.
//!
//! `KeyValueBackend` is the raw substrate (a directory of JSON files, or an
//! in-memory map). `LocalStore` wraps a backend with JSON (de)serialization
//! and a fail-open policy: a broken store reads as empty and drops writes,
//! so the application can always fall through to a network fetch.

pub mod backend;
pub mod local;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use local::LocalStore;
