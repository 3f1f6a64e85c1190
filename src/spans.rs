// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for bloomscan operations.
//!
//! Telemetry is kept out of business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async { /* business logic */ }.instrument(span).await
//! }
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber, TxHash};
use tracing::{Level, Span};

/// Create span for a full collection run over the archive.
///
/// This is the main public API entry point for log collection.
///
/// Parent: None (root span for this operation)
/// Children: process_candidate_block spans (one per candidate)
#[inline]
pub(crate) fn collect_logs(
    chain: NamedChain,
    base_block: BlockNumber,
    start_block: BlockNumber,
    with_inputs: bool,
) -> Span {
    tracing::span!(
        Level::INFO,
        "bloomscan.collect_logs",
        chain_id = %chain,
        base_block = base_block,
        start_block = start_block,
        with_inputs = with_inputs,
    )
}

/// Create span for confirming one candidate block against the node.
///
/// Parent: collect_logs span
/// Children: resolve_input spans (one per log when inputs are resolved)
#[inline]
pub(crate) fn process_candidate_block(block_number: BlockNumber) -> Span {
    tracing::debug_span!(
        "bloomscan.process_candidate_block",
        block_number = block_number,
    )
}

/// Create span for recovering the matched call input of a transaction.
///
/// Parent: process_candidate_block span
/// Children: RPC calls for the transaction and its call trace
#[inline]
pub(crate) fn resolve_input(tx_hash: TxHash, target: Address) -> Span {
    tracing::trace_span!(
        "bloomscan.resolve_input",
        tx_hash = %tx_hash,
        target = %target,
    )
}
