//! # Warbound Development Tools
//!
//! Command-line tools for development:
//! - Game configuration validation
//! - Reachability inspection (ASCII grid or JSON)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod inspect;
pub mod validate;
