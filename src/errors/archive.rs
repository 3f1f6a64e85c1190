// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for Bloom archive access.
//!
//! This module provides error types for operations in the `archive` module:
//! seeking into the archive, reading fixed-size records, and validating the
//! archive's length.

use alloy_primitives::BlockNumber;

/// Errors that can occur while reading a Bloom archive.
///
/// Reaching the end of the archive is not an error; a scan simply stops.
/// Every variant here is fatal to the scan that produced it.
///
/// # Examples
///
/// ```rust,ignore
/// use bloomscan::{ArchiveError, BloomArchive};
///
/// let archive = BloomArchive::new("block_blooms.dat");
/// for item in archive.scan(start_block, filter)? {
///     match item {
///         Ok(scan) if scan.is_candidate => println!("candidate {}", scan.block_number),
///         Ok(_) => {}
///         Err(ArchiveError::Corrupt { block_number, bytes_read }) => {
///             eprintln!("archive truncated at block {block_number} ({bytes_read} bytes)");
///         }
///         Err(e) => eprintln!("archive error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Underlying read or seek failure other than end of file.
    #[error("I/O error reading Bloom record for block {block_number}")]
    Io {
        /// Block whose record was being read (or sought) when the failure happened
        block_number: BlockNumber,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The archive ends with a partial record.
    ///
    /// Records are exactly 256 bytes. A shorter trailing record means the
    /// archive was truncated or is still being written.
    #[error("Corrupt archive: record for block {block_number} has {bytes_read} of 256 bytes")]
    Corrupt {
        /// Block whose record is incomplete
        block_number: BlockNumber,
        /// Number of bytes available for that record
        bytes_read: usize,
    },

    /// The requested block precedes the archive's first indexed block.
    #[error("Block {block_number} precedes archive base block {base_block}")]
    BeforeBase {
        /// Requested block
        block_number: BlockNumber,
        /// First block stored in the archive
        base_block: BlockNumber,
    },

    /// The byte offset of the requested block does not fit in a `u64`.
    #[error("Byte offset of block {block_number} overflows")]
    OffsetOverflow {
        /// Requested block
        block_number: BlockNumber,
    },
}

impl ArchiveError {
    /// Create an `Io` error for the record of `block_number`.
    pub fn io(block_number: BlockNumber, source: std::io::Error) -> Self {
        ArchiveError::Io {
            block_number,
            source,
        }
    }

    /// Create a `Corrupt` error for a partial record.
    pub fn corrupt(block_number: BlockNumber, bytes_read: usize) -> Self {
        ArchiveError::Corrupt {
            block_number,
            bytes_read,
        }
    }
}
