//! Incremental catalog synchronization
//!
//! This module provides:
//! - [`IncrementalBatchSyncer`], the per-store sync driver
//! - [`FetchSession`], the paging state of one store's pull
//! - Tagged per-store outcomes consumed by the run loop

mod session;
mod syncer;


pub use session::FetchSession;
pub use syncer::{
    BatchTally, Clock, IncrementalBatchSyncer, IncrementalBatchSyncerBuilder, StoreOutcome,
    SyncOptions, SystemClock,
};
