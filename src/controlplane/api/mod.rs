//! API Module
//!
//! REST API for file-system provisioning, SKU capability queries, subnet
//! sizing, archive jobs and metrics.

pub mod rest;
pub mod server;

pub use rest::*;
pub use server::*;
