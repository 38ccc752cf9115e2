//! External data sources.

pub mod bls;

pub use bls::*;
