//! Domain types and the pure pipeline stages.
//!
//! Nothing in here performs I/O; storage and payment execution are reached
//! through the traits in [`ports`].

pub mod compliance;
pub mod event;
pub mod fx;
pub mod outcome;
pub mod ports;
pub mod rail;
pub mod request;
pub mod wallet;
