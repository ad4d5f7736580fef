//! Lustre Provisioner
//!
//! Configuration validation and normalization for managed Lustre file
//! systems, and projection of the per-region SKU capability catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                      REST API (axum) / LustreService                         │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────────┐  │
//! │  │   Primitive     │  │   Cross-Field   │  │     Request Normalizer      │  │
//! │  │   Validators    │─▶│   Rule Engine   │─▶│  (defaults, zone placement) │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────┬───────────────┘  │
//! │                                                          │                   │
//! │  ┌─────────────────────────────┐                         │                   │
//! │  │  Capability Catalog         │                         │                   │
//! │  │  Projector                  │                         │                   │
//! │  └──────────────┬──────────────┘                         │                   │
//! ├─────────────────┼────────────────────────────────────────┼───────────────────┤
//! │                 │         Collaborator Ports             │                   │
//! │  ┌──────────────┴──────────────┐  ┌──────────────────────┴──────────────┐   │
//! │  │  SkuCatalogSource           │  │  ZoneAvailabilityResolver           │   │
//! │  │                             │  │  FileSystemProvisioner              │   │
//! │  └─────────────────────────────┘  └─────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`validation`]: Primitive validators, rule engine and request normalizer
//! - [`catalog`]: SKU capability projection and catalog-derived zone support
//! - [`model`]: SKUs, configuration groups and normalized aggregates
//! - [`controlplane`]: Service, metrics, in-memory backend and REST API
//! - [`domain`]: Collaborator traits
//! - [`error`]: Error types and handling

pub mod catalog;
pub mod controlplane;
pub mod domain;
pub mod error;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use controlplane::{
    ApiServer, ApiServerConfig, InMemoryBackendConfig, InMemoryLustreBackend, LustreService,
    ServiceConfig, ServiceMetrics,
};

pub use catalog::{load_catalog_file, project_capability_catalog, CatalogZoneResolver};

pub use domain::ports::{FileSystemProvisioner, SkuCatalogSource, ZoneAvailabilityResolver};

pub use error::{Error, ErrorKind, Result};

pub use model::{
    LustreFileSystem, ProjectedSkuRecord, ProvisioningRequest, RawSkuRecord, Sku, UpdatePatch,
    ZoneAvailability,
};

pub use validation::{
    validate_and_normalize_create, validate_and_normalize_update, CreateFields,
    IdentityRequirement, UpdateFields, ValidationPolicy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
