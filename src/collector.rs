// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bloom-pruned log collection
//!
//! Drives a full run: scan the archive from the checkpoint's resume point,
//! confirm each candidate block by fetching its logs, optionally recover the
//! call input behind each log, and append the results to the checkpoint.
//!
//! Progress is recorded block by block. A block's records are appended only
//! once every log of the block has been processed, so a run that fails midway
//! can be resumed from the checkpoint without duplicating records.

use alloy_chains::NamedChain;
use alloy_primitives::BlockNumber;
use tracing::{debug, info, warn, Instrument};

use crate::archive::BloomArchive;
use crate::checkpoint::{Checkpoint, CollectedLog};
use crate::errors::BloomscanError;
use crate::pacing::{IntervalPacer, Pacer};
use crate::query::LogQuery;
use crate::resolver::InputResolver;
use crate::source::ChainSource;
use crate::spans;
use crate::trace::CallMatcher;

/// Counters of a collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// First block scanned
    pub start_block: BlockNumber,
    /// Archive records tested against the filter
    pub blocks_scanned: u64,
    /// Records that passed the subset test
    pub candidate_blocks: u64,
    /// Candidates for which the node returned no matching logs
    pub false_positives: u64,
    /// Logs appended to the checkpoint
    pub records: u64,
    /// Logs whose transaction never made the requested call
    pub unresolved_inputs: u64,
}

impl CollectSummary {
    /// Share of candidate blocks that turned out to be false positives.
    pub fn false_positive_rate(&self) -> f64 {
        if self.candidate_blocks == 0 {
            return 0.0;
        }
        self.false_positives as f64 / self.candidate_blocks as f64
    }
}

/// Collects logs from Bloom candidate blocks.
///
/// # Examples
///
/// ```rust,ignore
/// use bloomscan::{BloomArchive, Checkpoint, IntervalPacer, LogCollector, LogQuery};
///
/// let collector = LogCollector::with_pacer(source, IntervalPacer::new(Some(delay)));
/// let mut checkpoint = Checkpoint::load("pools.json").await?;
///
/// let summary = collector
///     .collect(&archive, &query, Some(&matcher), 17_371_439, &mut checkpoint)
///     .await?;
/// checkpoint.save("pools.json").await?;
/// ```
#[derive(Debug, Clone)]
pub struct LogCollector<S, P = IntervalPacer> {
    resolver: InputResolver<S, P>,
    chain: NamedChain,
}

impl<S: ChainSource> LogCollector<S> {
    /// Creates a collector that does not pace its requests.
    pub fn new(source: S) -> Self {
        Self::with_pacer(source, IntervalPacer::none())
    }
}

impl<S: ChainSource, P: Pacer> LogCollector<S, P> {
    /// Creates a collector pacing each remote request with `pacer`.
    pub fn with_pacer(source: S, pacer: P) -> Self {
        Self {
            resolver: InputResolver::with_pacer(source, pacer),
            chain: NamedChain::Mainnet,
        }
    }

    /// Sets the chain reported in logs and spans.
    pub fn with_chain(mut self, chain: NamedChain) -> Self {
        self.chain = chain;
        self
    }

    /// Chain reported in logs and spans.
    pub fn chain(&self) -> NamedChain {
        self.chain
    }

    /// Resolver used for call inputs.
    pub fn resolver(&self) -> &InputResolver<S, P> {
        &self.resolver
    }

    /// Collects every log matching `query` from `from_block` to the end of
    /// the archive, resuming after the checkpoint's last processed block.
    ///
    /// With a `matcher`, each log's record also carries the input of the
    /// first matching call made by its transaction; a log whose transaction
    /// made no such call is kept without input and counted as unresolved.
    ///
    /// # Errors
    ///
    /// Archive failures, failed remote requests and undecodable traces abort
    /// the run. The checkpoint then reflects every block completed before
    /// the failure.
    pub async fn collect(
        &self,
        archive: &BloomArchive,
        query: &LogQuery,
        matcher: Option<&CallMatcher>,
        from_block: BlockNumber,
        checkpoint: &mut Checkpoint,
    ) -> Result<CollectSummary, BloomscanError> {
        let start_block = checkpoint.resume_from(from_block);
        let span = spans::collect_logs(
            self.chain,
            archive.base_block(),
            start_block,
            matcher.is_some(),
        );

        async move {
            let filter = query.composite_filter();
            let mut summary = CollectSummary {
                start_block,
                ..CollectSummary::default()
            };

            info!(
                chain = %self.chain,
                from_block = from_block,
                start_block = start_block,
                "Starting Bloom-pruned log collection"
            );

            for scanned in archive.scan(start_block, filter)? {
                let scanned = scanned?;
                summary.blocks_scanned += 1;

                if scanned.is_candidate {
                    summary.candidate_blocks += 1;
                    let records = self
                        .process_candidate(scanned.block_number, query, matcher, &mut summary)
                        .instrument(spans::process_candidate_block(scanned.block_number))
                        .await?;
                    summary.records += records.len() as u64;
                    checkpoint.records.extend(records);
                }

                checkpoint.advance(scanned.block_number);
            }

            info!(
                chain = %self.chain,
                blocks_scanned = summary.blocks_scanned,
                candidate_blocks = summary.candidate_blocks,
                false_positives = summary.false_positives,
                records = summary.records,
                unresolved_inputs = summary.unresolved_inputs,
                last_block = ?checkpoint.block,
                "Finished log collection"
            );

            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn process_candidate(
        &self,
        block_number: BlockNumber,
        query: &LogQuery,
        matcher: Option<&CallMatcher>,
        summary: &mut CollectSummary,
    ) -> Result<Vec<CollectedLog>, BloomscanError> {
        self.resolver.pacer().pace().await;
        let logs = self.resolver.source().block_logs(block_number, query).await?;

        if logs.is_empty() {
            debug!(block_number = block_number, "Candidate block was a false positive");
            summary.false_positives += 1;
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity(logs.len());
        for log in &logs {
            let record = CollectedLog::from_log(log, block_number);

            let Some(matcher) = matcher else {
                records.push(record);
                continue;
            };

            let input = match log.transaction_hash {
                Some(tx_hash) => self.resolver.resolve(tx_hash, matcher).await?,
                None => None,
            };
            if input.is_none() {
                warn!(
                    block_number = block_number,
                    tx_hash = ?log.transaction_hash,
                    target = %matcher.target(),
                    "No matching call found for log"
                );
                summary.unresolved_inputs += 1;
            }
            records.push(record.with_input(input));
        }

        debug!(
            block_number = block_number,
            logs_count = records.len(),
            "Collected logs from candidate block"
        );
        Ok(records)
    }
}
