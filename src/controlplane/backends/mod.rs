//! Backend Adapters
//!
//! Implementations of the collaborator ports:
//! - In-memory: catalog, zones and file-system lifecycle held in process

pub mod in_memory;

pub use in_memory::*;
