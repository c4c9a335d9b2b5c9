//! Shared value types

pub mod log_level;

pub use log_level::*;
