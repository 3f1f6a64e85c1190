// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Remote chain data needed after Bloom pruning
//!
//! The archive only says which blocks *might* contain matching logs. The
//! [`ChainSource`] trait covers the three remote lookups that confirm and
//! enrich a candidate: the block's logs, a transaction's top-level call, and a
//! transaction's call trace. [`RpcChainSource`] implements it over any alloy
//! [`Provider`].

use std::borrow::Cow;

use alloy_consensus::Transaction as _;
use alloy_primitives::{Address, BlockNumber, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::Log;
use alloy_rpc_types_trace::geth::{
    GethDebugBuiltInTracerType, GethDebugTracerType, GethDebugTracingOptions,
};
use alloy_transport::TransportResult;
use async_trait::async_trait;
use serde_json::value::RawValue;
use tracing::{debug, trace};

use crate::errors::{RpcError, TraceError};
use crate::query::LogQuery;
use crate::trace::CallNode;

const TRACE_METHOD: &str = "debug_traceTransaction";

/// Top-level call of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCall {
    /// Callee; `None` for contract creations
    pub to: Option<Address>,
    /// Call data
    pub input: Bytes,
}

/// Remote chain data consulted for candidate blocks.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Logs in `block_number` matching `query`.
    async fn block_logs(
        &self,
        block_number: BlockNumber,
        query: &LogQuery,
    ) -> Result<Vec<Log>, RpcError>;

    /// Top-level call of the transaction `tx_hash`.
    async fn transaction_call(&self, tx_hash: TxHash) -> Result<TransactionCall, RpcError>;

    /// Recorded call tree of the transaction `tx_hash`.
    async fn call_trace(&self, tx_hash: TxHash) -> Result<CallNode, TraceError>;
}

/// [`ChainSource`] backed by a JSON-RPC provider.
///
/// Call traces use `debug_traceTransaction` with geth's `callTracer`, so the
/// endpoint must expose the `debug` namespace for the trace fallback to work.
#[derive(Debug, Clone)]
pub struct RpcChainSource<P> {
    provider: P,
}

impl<P: Provider> RpcChainSource<P> {
    /// Wraps `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> ChainSource for RpcChainSource<P> {
    async fn block_logs(
        &self,
        block_number: BlockNumber,
        query: &LogQuery,
    ) -> Result<Vec<Log>, RpcError> {
        let filter = query.to_filter(block_number);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| RpcError::get_logs_failed(block_number, e))?;

        debug!(
            block_number = block_number,
            logs_count = logs.len(),
            "Fetched logs for candidate block"
        );
        Ok(logs)
    }

    async fn transaction_call(&self, tx_hash: TxHash) -> Result<TransactionCall, RpcError> {
        let transaction = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(|e| RpcError::get_transaction_failed(tx_hash, e))?
            .ok_or_else(|| RpcError::transaction_not_found(tx_hash))?;

        Ok(TransactionCall {
            to: transaction.to(),
            input: transaction.input().clone(),
        })
    }

    async fn call_trace(&self, tx_hash: TxHash) -> Result<CallNode, TraceError> {
        trace!(tx_hash = %tx_hash, "Requesting call trace");

        let options = GethDebugTracingOptions::default().with_tracer(
            GethDebugTracerType::BuiltInTracer(GethDebugBuiltInTracerType::CallTracer),
        );
        // Kept raw so deep traces are decoded without a nesting limit
        let response: TransportResult<Box<RawValue>> = self
            .provider
            .raw_request(Cow::Borrowed(TRACE_METHOD), (tx_hash, options))
            .await;
        let raw = response.map_err(|e| RpcError::trace_failed(tx_hash, e))?;

        if raw.get().trim() == "null" {
            return Err(TraceError::empty_trace(tx_hash));
        }
        CallNode::from_json(raw.get())
    }
}
