//! Data model
//!
//! Configuration groups, normalized aggregates and SKU catalog records.

pub mod filesystem;
pub mod sku;

pub use filesystem::*;
pub use sku::*;
