//! Feed synchronization.
//!
//! `Synchronizer::synchronize` decides between a full and a delta fetch,
//! merges and persists the result through the cache, and falls back to the
//! cached collection when the network fails. It always produces a
//! collection, possibly empty, plus an optional warning or error message.

pub mod orchestrator;
pub mod single_flight;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{FetchMode, SyncReport, SyncState, Synchronizer, PAGE_SIZE};
pub use single_flight::SingleFlight;
