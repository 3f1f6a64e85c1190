// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bloom-pruned EVM log search
//!
//! bloomscan finds the blocks that may contain logs of interest by testing a
//! local archive of per-block log Blooms, so only those blocks are fetched
//! from a node. It can also recover, for each matching log, the input of the
//! call into a target contract that produced it, even when that call was made
//! several hops down through routers or proxies.
//!
//! - [`bloom`] - encoding search keys into Bloom filters
//! - [`archive`] - scanning the Bloom archive for candidate blocks
//! - [`trace`] - call trees and exact call matching
//! - [`LogCollector`] - a full resumable collection run

pub mod archive;
pub mod bloom;
pub mod bootstrap;
pub mod checkpoint;
pub mod collector;
pub mod config;
pub mod errors;
pub mod pacing;
pub mod query;
pub mod resolver;
pub mod source;
pub mod trace;

mod spans;

pub use archive::{ArchiveScan, BlockScan, BloomArchive};
pub use checkpoint::{Checkpoint, CollectedLog};
pub use collector::{CollectSummary, LogCollector};
pub use config::{ChainConfig, ScanConfig, ScanConfigBuilder};
pub use errors::{
    ArchiveError, BloomscanError, CheckpointError, QueryError, RpcError, TraceError,
};
pub use pacing::{IntervalPacer, Pacer};
pub use query::{LogQuery, TopicPosition};
pub use resolver::InputResolver;
pub use source::{ChainSource, RpcChainSource, TransactionCall};
pub use trace::{find_call, CallKind, CallMatcher, CallNode};
