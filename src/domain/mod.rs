//! Shared domain types for observations, windows, and the series catalog.

pub mod types;

pub use types::*;
