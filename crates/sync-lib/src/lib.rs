//! Catalog sync library
//!
//! This crate provides the core functionality for:
//! - Enumerating stores and resolving their scoped sync settings
//! - Paging catalog products for a store, optionally since a watermark
//! - Pushing product batches to the remote products API
//! - Incremental per-store sync with watermark bookkeeping
//! - Audit logging and metrics

pub mod catalog;
pub mod models;
pub mod observability;
pub mod remote;
pub mod settings;
pub mod sync;

pub use models::*;
pub use observability::{AuditLog, SyncMetrics, TracingAuditLog};
