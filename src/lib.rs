//! Rolling statistics over the collections of a personal life tracker: tasks, habits, focus
//! sessions, expenses and books. The store is read as a snapshot, every derivation is a pure
//! function of that snapshot and the current instant.
//!

pub mod cli;
pub mod stats;
pub mod store;
pub mod utils;
