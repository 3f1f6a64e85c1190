// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for chain data source operations.
//!
//! This module provides error types for the remote calls a
//! [`ChainSource`](crate::ChainSource) makes: fetching the logs of a candidate
//! block, the top-level call of a transaction, and its call trace.

use alloy_primitives::BlockNumber;

/// Errors that can occur during blockchain RPC operations.
///
/// It includes context about what operation was being performed to aid in
/// debugging.
///
/// # Examples
///
/// ```rust
/// use bloomscan::RpcError;
///
/// let error = RpcError::TransactionNotFound {
///     tx_hash: "0x123...".to_string(),
/// };
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch logs for a block.
    ///
    /// This can occur due to rate limiting, network connectivity issues, or
    /// provider-side errors.
    #[error("Failed to fetch logs for block {block_number}")]
    GetLogsFailed {
        /// The candidate block whose logs were requested
        block_number: BlockNumber,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transaction was not found on the blockchain.
    ///
    /// This typically means the transaction hash is invalid or the transaction
    /// hasn't been indexed by the provider yet.
    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound {
        /// The transaction hash that wasn't found
        tx_hash: String,
    },

    /// The transaction lookup itself failed.
    #[error("Failed to fetch transaction {tx_hash}")]
    GetTransactionFailed {
        /// The transaction hash we tried to fetch
        tx_hash: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The node could not produce a call trace.
    ///
    /// Many public endpoints do not expose the `debug` namespace, in which
    /// case every trace request fails this way.
    #[error("Failed to trace transaction {tx_hash}")]
    TraceFailed {
        /// The transaction hash we tried to trace
        tx_hash: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RpcError {
    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        block_number: BlockNumber,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            block_number,
            source: Box::new(source),
        }
    }

    /// Helper to create a `TransactionNotFound` error.
    pub fn transaction_not_found(tx_hash: impl std::fmt::Display) -> Self {
        RpcError::TransactionNotFound {
            tx_hash: tx_hash.to_string(),
        }
    }

    /// Helper to create a `GetTransactionFailed` error from any error type.
    pub fn get_transaction_failed(
        tx_hash: impl std::fmt::Display,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetTransactionFailed {
            tx_hash: tx_hash.to_string(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `TraceFailed` error from any error type.
    pub fn trace_failed(
        tx_hash: impl std::fmt::Display,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::TraceFailed {
            tx_hash: tx_hash.to_string(),
            source: Box::new(source),
        }
    }
}
