//! Remote products API
//!
//! This module provides:
//! - The [`RemoteSyncClient`] seam used by the syncer
//! - A reqwest-based client for the warranty products endpoint
//! - Payload mapping from catalog records to the remote product shape
//! - The two recognised error kinds, configuration and submission

mod client;
mod error;
mod payload;

pub use client::{validate, ClientConfig, HttpProductsClient, RemoteSyncClient};
pub use error::{ConfigError, RemoteSyncError};
pub use payload::{ProductIdentifiers, ProductPayload, ProductPrice};
