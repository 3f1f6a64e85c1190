// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Persisted progress of a collection run
//!
//! A checkpoint holds the last fully processed block and every log collected
//! so far. It is stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "block": 17371502,
//!   "records": [
//!     {
//!       "address": "0x0c0e5f2ff0ff18a3be9b835635039256dc4b4963",
//!       "input": "0xc955fa04...",
//!       "topics": ["0xa307f5d0..."],
//!       "data": "0x",
//!       "blockNumber": "0x1091175",
//!       "transactionHash": "0x..."
//!     }
//!   ]
//! }
//! ```
//!
//! Saving writes a sibling temporary file and renames it over the target, so a
//! crash mid-write leaves the previous checkpoint intact.

use std::path::Path;

use alloy_primitives::{Address, BlockNumber, Bytes, TxHash, B256};
use alloy_rpc_types::Log;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::CheckpointError;

/// One collected log, with the matched call input when one was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedLog {
    /// Emitting contract
    pub address: Address,
    /// Input of the matched call, if resolution was requested and succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Bytes>,
    /// Indexed topics
    pub topics: Vec<B256>,
    /// Non-indexed data
    pub data: Bytes,
    /// Block containing the log
    #[serde(with = "quantity")]
    pub block_number: BlockNumber,
    /// Transaction that emitted the log
    pub transaction_hash: TxHash,
}

impl CollectedLog {
    /// Builds a record from an RPC log found in `block_number`.
    ///
    /// Block number and transaction hash fall back to `block_number` and the
    /// zero hash when the node omits them (pending logs).
    pub fn from_log(log: &Log, block_number: BlockNumber) -> Self {
        Self {
            address: log.address(),
            input: None,
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
            block_number: log.block_number.unwrap_or(block_number),
            transaction_hash: log.transaction_hash.unwrap_or_default(),
        }
    }

    /// Attaches the resolved call input.
    pub fn with_input(mut self, input: Option<Bytes>) -> Self {
        self.input = input;
        self
    }
}

/// Last processed block plus the records collected up to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last fully processed block, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockNumber>,
    /// Collected records, in block order
    #[serde(default)]
    pub records: Vec<CollectedLog>,
}

impl Checkpoint {
    /// Empty checkpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a checkpoint, or an empty one if `path` does not exist.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Checkpoint file does not exist, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(CheckpointError::io(path.display(), e)),
        };

        let checkpoint: Self = serde_json::from_slice(&bytes)
            .map_err(|e| CheckpointError::format(path.display(), e))?;

        info!(
            path = %path.display(),
            block = ?checkpoint.block,
            records = checkpoint.records.len(),
            "Loaded checkpoint"
        );
        Ok(checkpoint)
    }

    /// Writes the checkpoint to `path`, replacing any previous one.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CheckpointError::format(path.display(), e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CheckpointError::io(parent.display(), e))?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| CheckpointError::io(temp_path.display(), e))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| CheckpointError::io(path.display(), e))?;

        debug!(
            path = %path.display(),
            block = ?self.block,
            records = self.records.len(),
            "Saved checkpoint"
        );
        Ok(())
    }

    /// First block a run starting at `from_block` still has to process.
    ///
    /// A checkpoint that has reached `from_block` resumes after its last
    /// processed block; otherwise the run starts at `from_block`.
    pub fn resume_from(&self, from_block: BlockNumber) -> BlockNumber {
        match self.block {
            Some(block) if block >= from_block => block.saturating_add(1),
            _ => from_block,
        }
    }

    /// Marks `block_number` as fully processed.
    pub fn advance(&mut self, block_number: BlockNumber) {
        self.block = Some(self.block.map_or(block_number, |b| b.max(block_number)));
    }
}

/// Block numbers as hex quantities (`"0x1091175"`).
mod quantity {
    use alloy_primitives::{BlockNumber, U64};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &BlockNumber,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        U64::from(*value).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BlockNumber, D::Error> {
        U64::deserialize(deserializer).map(|value| value.to::<BlockNumber>())
    }
}
