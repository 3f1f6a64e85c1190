// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for bloomscan integration tests
//!
//! Provides mock implementations of traits and on-disk archive fixtures to
//! enable testing without real blockchain connections.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, BlockNumber, Bloom, Bytes, LogData, TxHash, B256};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use bloomscan::{
    CallNode, ChainSource, LogQuery, Pacer, RpcError, TopicPosition, TraceError, TransactionCall,
};

/// Mock ChainSource serving canned logs, transactions and traces
///
/// Counts every request so tests can assert which lookups were made.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockChainSource::new()
///     .with_logs(17_371_450, vec![create_test_log(factory, vec![topic], vec![], 17_371_450, tx)])
///     .with_transaction(tx, Some(router), router_input)
///     .with_trace(tx, trace);
/// ```
#[derive(Default)]
pub struct MockChainSource {
    logs: HashMap<BlockNumber, Vec<Log>>,
    transactions: HashMap<TxHash, TransactionCall>,
    traces: HashMap<TxHash, CallNode>,
    failing_blocks: HashSet<BlockNumber>,
    failing_traces: HashSet<TxHash>,
    requested_blocks: Mutex<Vec<BlockNumber>>,
    transaction_requests: AtomicUsize,
    trace_requests: AtomicUsize,
}

impl MockChainSource {
    /// Create a new MockChainSource with no data
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs returned for `block_number`; other blocks have none
    pub fn with_logs(mut self, block_number: BlockNumber, logs: Vec<Log>) -> Self {
        self.logs.insert(block_number, logs);
        self
    }

    /// Top-level call of `tx_hash`
    pub fn with_transaction(mut self, tx_hash: TxHash, to: Option<Address>, input: Bytes) -> Self {
        self.transactions
            .insert(tx_hash, TransactionCall { to, input });
        self
    }

    /// Call trace of `tx_hash`
    pub fn with_trace(mut self, tx_hash: TxHash, trace: CallNode) -> Self {
        self.traces.insert(tx_hash, trace);
        self
    }

    /// Make log requests for `block_number` fail
    pub fn with_failing_block(mut self, block_number: BlockNumber) -> Self {
        self.failing_blocks.insert(block_number);
        self
    }

    /// Make trace requests for `tx_hash` fail
    pub fn with_failing_trace(mut self, tx_hash: TxHash) -> Self {
        self.failing_traces.insert(tx_hash);
        self
    }

    /// Blocks whose logs were requested, in request order
    pub fn requested_blocks(&self) -> Vec<BlockNumber> {
        self.requested_blocks.lock().unwrap().clone()
    }

    /// Number of transaction lookups made
    pub fn transaction_requests(&self) -> usize {
        self.transaction_requests.load(Ordering::SeqCst)
    }

    /// Number of trace lookups made
    pub fn trace_requests(&self) -> usize {
        self.trace_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainSource for MockChainSource {
    async fn block_logs(
        &self,
        block_number: BlockNumber,
        query: &LogQuery,
    ) -> Result<Vec<Log>, RpcError> {
        self.requested_blocks.lock().unwrap().push(block_number);

        if self.failing_blocks.contains(&block_number) {
            return Err(RpcError::get_logs_failed(
                block_number,
                std::io::Error::other("connection reset"),
            ));
        }

        // Apply the query the way a node would
        let logs = self.logs.get(&block_number).cloned().unwrap_or_default();
        Ok(logs
            .into_iter()
            .filter(|log| {
                (query.addresses().is_empty() || query.addresses().contains(&log.address()))
                    && TopicPosition::ALL.into_iter().all(|position| {
                        let wanted = query.topics(position);
                        wanted.is_empty()
                            || log
                                .topics()
                                .get(position.index())
                                .is_some_and(|topic| wanted.contains(topic))
                    })
            })
            .collect())
    }

    async fn transaction_call(&self, tx_hash: TxHash) -> Result<TransactionCall, RpcError> {
        self.transaction_requests.fetch_add(1, Ordering::SeqCst);
        self.transactions
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| RpcError::transaction_not_found(tx_hash))
    }

    async fn call_trace(&self, tx_hash: TxHash) -> Result<CallNode, TraceError> {
        self.trace_requests.fetch_add(1, Ordering::SeqCst);

        if self.failing_traces.contains(&tx_hash) {
            return Err(RpcError::trace_failed(
                tx_hash,
                std::io::Error::other("method not found"),
            )
            .into());
        }
        self.traces
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| TraceError::empty_trace(tx_hash))
    }
}

/// Pacer counting how often it was asked to wait
#[derive(Debug, Default)]
pub struct CountingPacer {
    paces: AtomicUsize,
}

impl CountingPacer {
    pub fn count(&self) -> usize {
        self.paces.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pace(&self) {
        self.paces.fetch_add(1, Ordering::SeqCst);
    }
}

/// Helper to create a minimal Log for testing
pub fn create_test_log(
    address: Address,
    topics: Vec<B256>,
    data: Vec<u8>,
    block_number: BlockNumber,
    tx_hash: TxHash,
) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address,
            data: LogData::new(topics, data.into()).unwrap(),
        },
        block_hash: Some(B256::ZERO),
        block_number: Some(block_number),
        block_timestamp: Some(1234567890),
        transaction_hash: Some(tx_hash),
        transaction_index: Some(0),
        log_index: Some(0),
        removed: false,
    }
}

/// Helper to create a transaction hash from a single repeated byte
pub fn tx_hash(byte: u8) -> TxHash {
    B256::repeat_byte(byte)
}

/// Helper to build a call node with no sub-calls
pub fn leaf_call(to: Address, input: Bytes) -> CallNode {
    CallNode {
        from: Address::ZERO,
        to: Some(to),
        input,
        output: Bytes::new(),
        kind: bloomscan::CallKind::Call,
        calls: Vec::new(),
    }
}

/// Writes `records` back to back as an archive file under `dir`
pub fn write_archive(dir: &Path, records: &[Bloom]) -> PathBuf {
    let path = dir.join("blooms.dat");
    let bytes: Vec<u8> = records
        .iter()
        .flat_map(|record| record.as_slice().iter().copied())
        .collect();
    std::fs::write(&path, bytes).unwrap();
    path
}
