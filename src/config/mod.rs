//! # Configuration Module
//!
//! Centralizes the fixed corpus-layout constants and profile discovery
//! parameters. Values that depend on each other live together and are
//! checked by compile-time assertions.
//!
//! - [`constants`]: all numeric and path constants with their relationships

pub mod constants;
pub use constants::*;
