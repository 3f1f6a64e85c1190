// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Sequential scanning of a per-block Bloom archive
//!
//! The archive is a flat binary file of 256-byte log Bloom records, one per
//! block, in increasing block order starting at a base block (0 unless
//! configured). The record for block `N` occupies bytes
//! `[(N - base) * 256, (N - base) * 256 + 256)`, so any block's Bloom is
//! addressable without parsing anything else.
//!
//! Scanning tests every record against a composite search filter with the
//! subset test from [`crate::bloom`]. A block that logged every search key is
//! always reported as a candidate; other blocks may be reported too (false
//! positives), and resolving them requires fetching the block's actual logs.
//!
//! # Examples
//!
//! ```rust,ignore
//! use bloomscan::{bloom, BloomArchive};
//!
//! let archive = BloomArchive::new("block_blooms.dat");
//! let filter = bloom::encode_all([factory.as_slice(), topic0.as_slice()]);
//!
//! for block in archive.scan(17_371_439, filter)?.candidates() {
//!     println!("candidate block {}", block?);
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use alloy_primitives::{BlockNumber, Bloom};
use tracing::{debug, warn};

use crate::bloom::is_candidate;
use crate::config::constants::BLOOM_RECORD_SIZE;
use crate::errors::ArchiveError;

const RECORD_SIZE: u64 = BLOOM_RECORD_SIZE as u64;

/// Outcome of testing one archive record against the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockScan {
    /// Block the record belongs to
    pub block_number: BlockNumber,
    /// Whether the block's Bloom contains every bit of the search filter
    pub is_candidate: bool,
}

/// A Bloom archive file on disk.
///
/// Holds only the path and the base block; each scan opens its own handle,
/// which is released when the scan is dropped.
#[derive(Debug, Clone)]
pub struct BloomArchive {
    path: PathBuf,
    base_block: BlockNumber,
}

impl BloomArchive {
    /// Creates an archive handle whose first record is block 0.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            base_block: 0,
        }
    }

    /// Sets the block number of the archive's first record.
    pub fn with_base_block(mut self, base_block: BlockNumber) -> Self {
        self.base_block = base_block;
        self
    }

    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block number of the archive's first record.
    pub fn base_block(&self) -> BlockNumber {
        self.base_block
    }

    /// Starts a scan at `start_block`.
    ///
    /// Starting past the end of the archive yields an empty scan.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened, if `start_block` precedes the base
    /// block, or if the seek fails.
    pub fn scan(
        &self,
        start_block: BlockNumber,
        filter: Bloom,
    ) -> Result<ArchiveScan<File>, ArchiveError> {
        let file = self.open(start_block)?;
        ArchiveScan::new(file, self.base_block, start_block, filter)
    }

    /// Reads the record of a single block, or `None` past the end.
    pub fn record(&self, block_number: BlockNumber) -> Result<Option<Bloom>, ArchiveError> {
        let offset = record_offset(self.base_block, block_number)?;
        let mut file = self.open(block_number)?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| ArchiveError::io(block_number, e))?;

        let mut record = [0u8; BLOOM_RECORD_SIZE];
        match fill_record(&mut file, &mut record).map_err(|e| ArchiveError::io(block_number, e))? {
            0 => Ok(None),
            BLOOM_RECORD_SIZE => Ok(Some(Bloom::new(record))),
            partial => Err(ArchiveError::corrupt(block_number, partial)),
        }
    }

    /// Number of complete records in the archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Corrupt`] if the file length is not a whole
    /// number of records.
    pub fn block_count(&self) -> Result<u64, ArchiveError> {
        let len = std::fs::metadata(&self.path)
            .map_err(|e| ArchiveError::io(self.base_block, e))?
            .len();

        let count = len / RECORD_SIZE;
        let remainder = len % RECORD_SIZE;
        if remainder != 0 {
            return Err(ArchiveError::corrupt(
                self.base_block + count,
                remainder as usize,
            ));
        }
        Ok(count)
    }

    /// Last block with a record, or `None` for an empty archive.
    pub fn last_block(&self) -> Result<Option<BlockNumber>, ArchiveError> {
        let count = self.block_count()?;
        Ok(count.checked_sub(1).map(|last| self.base_block + last))
    }

    fn open(&self, block_number: BlockNumber) -> Result<File, ArchiveError> {
        File::open(&self.path).map_err(|e| ArchiveError::io(block_number, e))
    }
}

/// Lazy scan over archive records.
///
/// Yields one [`BlockScan`] per record. End of archive ends the iteration; a
/// partial trailing record or an I/O failure yields a single error and then
/// ends it. The underlying reader is owned by the scan and dropped with it.
#[derive(Debug)]
pub struct ArchiveScan<R> {
    reader: BufReader<R>,
    filter: Bloom,
    next_block: BlockNumber,
    finished: bool,
}

impl<R: Read + Seek> ArchiveScan<R> {
    /// Positions `reader` at the record of `start_block` and prepares a scan.
    pub fn new(
        mut reader: R,
        base_block: BlockNumber,
        start_block: BlockNumber,
        filter: Bloom,
    ) -> Result<Self, ArchiveError> {
        let offset = record_offset(base_block, start_block)?;
        let position = reader
            .seek(SeekFrom::Start(offset))
            .map_err(|e| ArchiveError::io(start_block, e))?;

        debug!(
            base_block = base_block,
            start_block = start_block,
            offset = position,
            "Positioned Bloom archive"
        );

        Ok(Self {
            reader: BufReader::with_capacity(BLOOM_RECORD_SIZE * 64, reader),
            filter,
            next_block: start_block,
            finished: false,
        })
    }

    /// Block number of the next record to be read.
    pub fn next_block(&self) -> BlockNumber {
        self.next_block
    }

    /// Narrows the scan to candidate block numbers.
    pub fn candidates(self) -> impl Iterator<Item = Result<BlockNumber, ArchiveError>> {
        self.filter_map(|item| match item {
            Ok(scan) if scan.is_candidate => Some(Ok(scan.block_number)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }

    fn read_record(&mut self) -> Option<Result<Bloom, ArchiveError>> {
        let mut record = [0u8; BLOOM_RECORD_SIZE];
        match fill_record(&mut self.reader, &mut record) {
            Ok(0) => None,
            Ok(BLOOM_RECORD_SIZE) => Some(Ok(Bloom::new(record))),
            Ok(partial) => {
                warn!(
                    block_number = self.next_block,
                    bytes_read = partial,
                    "Partial Bloom record at end of archive"
                );
                Some(Err(ArchiveError::corrupt(self.next_block, partial)))
            }
            Err(e) => Some(Err(ArchiveError::io(self.next_block, e))),
        }
    }
}

impl<R: Read + Seek> Iterator for ArchiveScan<R> {
    type Item = Result<BlockScan, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Some(Ok(record)) => {
                let scan = BlockScan {
                    block_number: self.next_block,
                    is_candidate: is_candidate(&record, &self.filter),
                };
                self.next_block += 1;
                Some(Ok(scan))
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                debug!(end_block = self.next_block, "Reached end of Bloom archive");
                self.finished = true;
                None
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for ArchiveScan<R> {}

fn record_offset(base_block: BlockNumber, block_number: BlockNumber) -> Result<u64, ArchiveError> {
    let index = block_number
        .checked_sub(base_block)
        .ok_or(ArchiveError::BeforeBase {
            block_number,
            base_block,
        })?;
    index
        .checked_mul(RECORD_SIZE)
        .ok_or(ArchiveError::OffsetOverflow { block_number })
}

/// Reads until `record` is full or the reader is exhausted.
///
/// Returns the number of bytes read: 0 at a clean end, less than the record
/// size for a partial record.
fn fill_record(reader: &mut impl Read, record: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < record.len() {
        match reader.read(&mut record[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
