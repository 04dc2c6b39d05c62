//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside cache callers.
//!
//! # Tasks
//! - Eviction sweep: drops expired entries, then evicts least-used entries
//!   while the store is over its memory budget

mod sweeper;

pub use sweeper::spawn_sweeper;
