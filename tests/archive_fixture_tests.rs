// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Candidate search over an on-disk Bloom archive
//!
//! The fixture archive starts at the fixture block and mixes records that
//! contain the fixture address and topic with records that contain only one
//! of them, nothing, or everything.

mod helpers;

use alloy_primitives::Bloom;
use bloomscan::bloom::{combine, encode};
use bloomscan::config::constants::fixtures::{FIXTURE_ADDRESS, FIXTURE_FROM_BLOCK, FIXTURE_TOPIC};
use bloomscan::{ArchiveError, BloomArchive, LogQuery};
use helpers::write_archive;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use tempfile::TempDir;

fn fixture_query() -> LogQuery {
    LogQuery::new()
        .with_address(FIXTURE_ADDRESS)
        .with_event_signature(FIXTURE_TOPIC)
}

fn fixture_records() -> Vec<Bloom> {
    let address = encode(FIXTURE_ADDRESS.as_slice());
    let topic = encode(FIXTURE_TOPIC.as_slice());
    let noise = combine([encode(b"hello"), encode(&[0u8; 20])]);

    vec![
        combine([address, topic]),        // +0 candidate
        address,                          // +1
        Bloom::ZERO,                      // +2
        combine([address, topic, noise]), // +3 candidate
        Bloom::new([0xff; 256]),          // +4 candidate
        topic,                            // +5
        combine([topic, address]),        // +6 candidate
        noise,                            // +7
    ]
}

fn fixture_archive(dir: &TempDir, records: &[Bloom]) -> BloomArchive {
    BloomArchive::new(write_archive(dir.path(), records)).with_base_block(FIXTURE_FROM_BLOCK)
}

fn candidates(archive: &BloomArchive, start_block: u64) -> Result<Vec<u64>, ArchiveError> {
    archive
        .scan(start_block, fixture_query().composite_filter())?
        .candidates()
        .collect()
}

#[test]
fn test_fixture_candidate_count() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    let found = candidates(&archive, FIXTURE_FROM_BLOCK).unwrap();

    assert_eq!(found.len(), 4);
    assert_eq!(
        found,
        vec![
            FIXTURE_FROM_BLOCK,
            FIXTURE_FROM_BLOCK + 3,
            FIXTURE_FROM_BLOCK + 4,
            FIXTURE_FROM_BLOCK + 6,
        ]
    );
}

#[test]
fn test_scan_reports_every_block_in_order() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    let scans: Vec<_> = archive
        .scan(FIXTURE_FROM_BLOCK, fixture_query().composite_filter())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(scans.len(), 8);
    for (i, scan) in scans.iter().enumerate() {
        assert_eq!(scan.block_number, FIXTURE_FROM_BLOCK + i as u64);
    }
}

/// Archive indexed from genesis, holding the fixture records at their
/// absolute offsets and holes everywhere before them.
#[test]
fn test_genesis_archive_seeks_to_absolute_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genesis.dat");
    let records = fixture_records();
    let record_size = 256u64;

    let mut file = File::create(&path).unwrap();
    file.set_len((FIXTURE_FROM_BLOCK + records.len() as u64) * record_size)
        .unwrap();
    file.seek(SeekFrom::Start(FIXTURE_FROM_BLOCK * record_size))
        .unwrap();
    for record in &records {
        file.write_all(record.as_slice()).unwrap();
    }
    drop(file);

    let archive = BloomArchive::new(&path);
    assert_eq!(archive.base_block(), 0);
    assert_eq!(archive.last_block().unwrap(), Some(FIXTURE_FROM_BLOCK + 7));

    let found = candidates(&archive, FIXTURE_FROM_BLOCK).unwrap();
    assert_eq!(
        found,
        vec![
            FIXTURE_FROM_BLOCK,
            FIXTURE_FROM_BLOCK + 3,
            FIXTURE_FROM_BLOCK + 4,
            FIXTURE_FROM_BLOCK + 6,
        ]
    );
    assert_eq!(archive.record(FIXTURE_FROM_BLOCK - 1).unwrap(), Some(Bloom::ZERO));
}

#[test]
fn test_start_mid_archive_skips_earlier_records() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    let found = candidates(&archive, FIXTURE_FROM_BLOCK + 2).unwrap();

    assert_eq!(
        found,
        vec![
            FIXTURE_FROM_BLOCK + 3,
            FIXTURE_FROM_BLOCK + 4,
            FIXTURE_FROM_BLOCK + 6
        ]
    );
}

#[test]
fn test_start_past_end_is_empty() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    assert!(candidates(&archive, FIXTURE_FROM_BLOCK + 100).unwrap().is_empty());
}

#[test]
fn test_start_before_base_is_rejected() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    assert!(matches!(
        candidates(&archive, FIXTURE_FROM_BLOCK - 1),
        Err(ArchiveError::BeforeBase { .. })
    ));
}

#[test]
fn test_truncated_tail_is_corrupt_after_complete_records() {
    let dir = TempDir::new().unwrap();
    let path = write_archive(dir.path(), &fixture_records()[..4]);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.extend_from_slice(&[0xff; 100]);
    std::fs::write(&path, bytes).unwrap();
    let archive = BloomArchive::new(&path).with_base_block(FIXTURE_FROM_BLOCK);

    let results: Vec<_> = archive
        .scan(FIXTURE_FROM_BLOCK, fixture_query().composite_filter())
        .unwrap()
        .candidates()
        .collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &FIXTURE_FROM_BLOCK);
    assert_eq!(results[1].as_ref().unwrap(), &(FIXTURE_FROM_BLOCK + 3));
    assert!(matches!(
        results[2],
        Err(ArchiveError::Corrupt { block_number, bytes_read: 100 })
            if block_number == FIXTURE_FROM_BLOCK + 4
    ));

    assert!(matches!(archive.block_count(), Err(ArchiveError::Corrupt { .. })));
}

#[test]
fn test_missing_archive_is_io_error() {
    let dir = TempDir::new().unwrap();
    let archive = BloomArchive::new(dir.path().join("missing.dat"));

    assert!(matches!(
        archive.scan(0, Bloom::ZERO),
        Err(ArchiveError::Io { .. })
    ));
}

#[test]
fn test_single_record_lookup() {
    let dir = TempDir::new().unwrap();
    let records = fixture_records();
    let archive = fixture_archive(&dir, &records);

    assert_eq!(archive.block_count().unwrap(), 8);
    assert_eq!(archive.last_block().unwrap(), Some(FIXTURE_FROM_BLOCK + 7));
    assert_eq!(
        archive.record(FIXTURE_FROM_BLOCK + 5).unwrap(),
        Some(records[5])
    );
    assert_eq!(archive.record(FIXTURE_FROM_BLOCK + 8).unwrap(), None);
}

#[test]
fn test_zero_filter_makes_every_block_a_candidate() {
    let dir = TempDir::new().unwrap();
    let archive = fixture_archive(&dir, &fixture_records());

    let found: Vec<_> = archive
        .scan(FIXTURE_FROM_BLOCK, LogQuery::new().composite_filter())
        .unwrap()
        .candidates()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(found.len(), 8);
}
