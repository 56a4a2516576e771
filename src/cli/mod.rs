//! CLI command handling

pub mod wrap;

pub use wrap::*;
