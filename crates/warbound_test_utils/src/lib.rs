//! # Warbound Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Board and unit fixtures, scripted dice
//! - Determinism harness over command streams
//! - Seeded duel statistics
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
