//! # snsmock-store
//!
//! Capture store for snsmock.
//!
//! This crate provides:
//! - A bounded, multi-indexed in-memory repository of captured messages
//! - O(1) lookup by id and by topic
//! - FIFO eviction by insertion order
//! - The duplicate probe used for FIFO deduplication

pub mod store;

pub use store::{CaptureStore, DEFAULT_CAPACITY};
