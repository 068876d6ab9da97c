//! Car park storage

pub mod memory;

pub use memory::{InMemoryCarParkTable, SharedCarParkTable};
