//! Adapters for the domain ports: event/retry stores and payment executors.

pub mod in_memory;
pub mod jsonl;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod simulated;
