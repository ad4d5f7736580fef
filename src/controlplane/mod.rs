//! Lustre Control Plane Module
//!
//! Use-case entry points that compose the validation engine, the request
//! normalizer and the catalog projector with the backend collaborators,
//! plus the HTTP surface in front of them.

pub mod api;
pub mod backends;
pub mod metrics;
pub mod service;

pub use api::*;
pub use backends::*;
pub use metrics::*;
pub use service::*;

/// Subscription used when neither the caller nor the configuration names one
pub const DEFAULT_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";
