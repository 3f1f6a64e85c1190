// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the bloomscan library.
//!
//! This module provides strongly-typed errors for all public APIs in bloomscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`ArchiveError`,
//!   `TraceError`, etc.)
//! - **Unified error type** (`BloomscanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! Each major module has its own error type:
//! - [`ArchiveError`] - Errors from reading the Bloom archive
//! - [`TraceError`] - Errors from fetching or decoding call traces
//! - [`CheckpointError`] - Errors from loading or saving checkpoints
//! - [`QueryError`] - Errors from building log queries
//!
//! Additionally, [`RpcError`] provides shared error variants for chain data
//! source operations.
//!
//! Encoding search keys never fails, and a call trace without a matching call
//! is reported as `None`, not as an error.
//!
//! # Examples
//!
//! ```rust,ignore
//! use bloomscan::{BloomscanError, LogCollector};
//!
//! async fn run() -> Result<(), BloomscanError> {
//!     let summary = collector
//!         .collect(&archive, &query, Some(&matcher), from_block, &mut checkpoint)
//!         .await?;
//!     checkpoint.save("pools.json").await?;
//!     Ok(())
//! }
//! ```

mod archive;
mod checkpoint;
mod query;
mod rpc;
mod trace;

pub use archive::ArchiveError;
pub use checkpoint::CheckpointError;
pub use query::QueryError;
pub use rpc::RpcError;
pub use trace::TraceError;

/// Unified error type for all bloomscan operations.
///
/// All module-specific error types automatically convert to `BloomscanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum BloomscanError {
    /// Error from reading the Bloom archive.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Error from fetching or decoding a call trace.
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// Error from the chain data source.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Error from checkpoint persistence.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Error from building a log query.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}
