//! Input/output helpers.
//!
//! - observation store read/merge/write (`store`)
//! - windowed-view exports (`export`)

pub mod export;
pub mod store;

pub use export::*;
pub use store::*;
