//! Timing-safe comparison primitives used by certificate pinning

pub mod constant_time;

pub use constant_time::{salted_eq, salted_str_eq};
