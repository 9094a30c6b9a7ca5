//! Cryptographic utilities
//!
//! This module provides:
//! - Multipart boundary generation
//! - Salt generation for constant-time comparisons

pub mod random;

pub use random::*;
