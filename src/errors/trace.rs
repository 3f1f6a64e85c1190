// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for call trace fetching and decoding.
//!
//! Not finding a matching call is not an error: matching returns `None` for
//! that case. The variants here describe traces that could not be obtained or
//! could not be understood.

use super::RpcError;

/// Errors that can occur while obtaining or decoding a call trace.
///
/// # Examples
///
/// ```rust,ignore
/// use bloomscan::{InputResolver, TraceError};
///
/// match resolver.resolve(tx_hash, &matcher).await {
///     Ok(Some(input)) => println!("call data: {input}"),
///     Ok(None) => println!("no matching call in {tx_hash}"),
///     Err(TraceError::Fetch(e)) => eprintln!("node failed, retry later: {e}"),
///     Err(e) => eprintln!("bad trace: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The trace or transaction could not be fetched from the data source.
    ///
    /// The caller decides whether to retry.
    #[error("Failed to fetch trace data: {0}")]
    Fetch(#[from] RpcError),

    /// The supplied trace does not have the expected call tree shape.
    #[error("Failed to decode call trace: {details}")]
    Decode {
        /// Details about why the decode failed
        details: String,
    },

    /// The data source returned no trace at all for the transaction.
    #[error("Empty call trace for transaction {tx_hash}")]
    EmptyTrace {
        /// The traced transaction
        tx_hash: String,
    },

    /// Invalid input provided to an operation.
    ///
    /// This occurs when function arguments don't meet requirements,
    /// such as an empty selector set.
    #[error("Invalid input: {details}")]
    InvalidInput {
        /// Details about what was invalid
        details: String,
    },
}

impl TraceError {
    /// Create a `Decode` error with details.
    pub fn decode(details: impl Into<String>) -> Self {
        TraceError::Decode {
            details: details.into(),
        }
    }

    /// Create an `EmptyTrace` error for a transaction.
    pub fn empty_trace(tx_hash: impl std::fmt::Display) -> Self {
        TraceError::EmptyTrace {
            tx_hash: tx_hash.to_string(),
        }
    }

    /// Create an `InvalidInput` error with details.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        TraceError::InvalidInput {
            details: details.into(),
        }
    }

    /// Returns `true` if the error came from the data source rather than the
    /// trace contents.
    pub fn is_fetch(&self) -> bool {
        matches!(self, TraceError::Fetch(_))
    }
}
