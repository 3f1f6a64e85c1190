// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Log Bloom encoding for search keys
//!
//! Turns raw search keys (contract addresses, event topics) into 2048-bit
//! Bloom values and combines them into a composite search filter.
//!
//! Each key sets at most three bits: the key is hashed with keccak-256, and
//! the big-endian `u16` slices at hash offsets 0, 2 and 4 are masked to 11 bits.
//! Bit `b` lives in byte `255 - b / 8` under mask `1 << (b % 8)`, which is the
//! byte layout of [`Bloom`] and of the archive records.
//!
//! # Examples
//!
//! ```rust
//! use alloy_primitives::{address, b256};
//! use bloomscan::bloom::{combine, encode, is_candidate};
//!
//! let pool_factory = address!("0c0e5f2ff0ff18a3be9b835635039256dc4b4963");
//! let deployed = b256!("a307f5d0802489baddec443058a63ce115756de9020e2b07d3e2cd2f21269e2a");
//!
//! let filter = combine([encode(pool_factory.as_slice()), encode(deployed.as_slice())]);
//!
//! // A block that logged both keys passes the subset test
//! let block_bloom = filter;
//! assert!(is_candidate(&block_bloom, &filter));
//! ```

use alloy_primitives::{keccak256, Bloom};

use crate::config::constants::{
    BITS_PER_KEY, BIT_INDEX_MASK, BLOOM_RECORD_SIZE, HASH_SLICE_OFFSETS,
};

/// Bit positions (`0..=2047`) derived from a search key.
///
/// Positions may repeat when two hash slices collide.
pub fn bit_positions(key: &[u8]) -> [u16; BITS_PER_KEY] {
    let hash = keccak256(key);
    HASH_SLICE_OFFSETS
        .map(|offset| u16::from_be_bytes([hash[offset], hash[offset + 1]]) & BIT_INDEX_MASK)
}

/// Encodes a single search key into its Bloom value.
pub fn encode(key: &[u8]) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for position in bit_positions(key) {
        set_bit(&mut bloom, position);
    }
    bloom
}

/// Encodes every key and combines the results.
pub fn encode_all<'a>(keys: impl IntoIterator<Item = &'a [u8]>) -> Bloom {
    combine(keys.into_iter().map(encode))
}

/// Bitwise OR of all values; the zero Bloom for an empty input.
pub fn combine(values: impl IntoIterator<Item = Bloom>) -> Bloom {
    values.into_iter().fold(Bloom::ZERO, |acc, value| acc | value)
}

/// Subset test: every bit set in `filter` is also set in `record`.
///
/// Never gives a false negative. A zero filter matches every record.
pub fn is_candidate(record: &Bloom, filter: &Bloom) -> bool {
    (*record & *filter) == *filter
}

/// Returns whether bit `position` is set.
pub fn bit_is_set(bloom: &Bloom, position: u16) -> bool {
    let (byte, mask) = locate(position);
    bloom[byte] & mask != 0
}

/// Number of set bits.
pub fn count_ones(bloom: &Bloom) -> u32 {
    bloom.iter().map(|byte| byte.count_ones()).sum()
}

fn set_bit(bloom: &mut Bloom, position: u16) {
    let (byte, mask) = locate(position);
    bloom[byte] |= mask;
}

fn locate(position: u16) -> (usize, u8) {
    let position = usize::from(position & BIT_INDEX_MASK);
    (BLOOM_RECORD_SIZE - 1 - position / 8, 1 << (position % 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::fixtures::{FIXTURE_ADDRESS, FIXTURE_TOPIC};
    use alloy_primitives::{address, BloomInput};

    #[test]
    fn test_fixture_address_positions() {
        assert_eq!(bit_positions(FIXTURE_ADDRESS.as_slice()), [882, 999, 125]);
    }

    #[test]
    fn test_fixture_topic_positions() {
        assert_eq!(bit_positions(FIXTURE_TOPIC.as_slice()), [1298, 1696, 1092]);
    }

    #[test]
    fn test_empty_key_positions() {
        assert_eq!(bit_positions(&[]), [1490, 1537, 1783]);
    }

    #[test]
    fn test_encode_byte_layout_is_big_endian() {
        let bloom = encode(FIXTURE_ADDRESS.as_slice());

        // 882 -> byte 145 bit 2, 999 -> byte 131 bit 7, 125 -> byte 240 bit 5
        assert_eq!(bloom[145], 0x04);
        assert_eq!(bloom[131], 0x80);
        assert_eq!(bloom[240], 0x20);
        assert_eq!(count_ones(&bloom), 3);
    }

    #[test]
    fn test_encode_matches_alloy_accrue() {
        let keys: [&[u8]; 4] = [
            FIXTURE_ADDRESS.as_slice(),
            FIXTURE_TOPIC.as_slice(),
            b"hello",
            &[],
        ];
        for key in keys {
            assert_eq!(encode(key), Bloom::from(BloomInput::Raw(key)));
        }
    }

    #[test]
    fn test_combine_empty_is_zero() {
        assert_eq!(combine(std::iter::empty()), Bloom::ZERO);
    }

    #[test]
    fn test_composite_filter_has_both_keys() {
        let filter = encode_all([FIXTURE_ADDRESS.as_slice(), FIXTURE_TOPIC.as_slice()]);

        assert_eq!(count_ones(&filter), 6);
        for position in [882, 999, 125, 1298, 1696, 1092] {
            assert!(bit_is_set(&filter, position));
        }
    }

    #[test]
    fn test_subset_test_requires_every_filter_bit() {
        let address_only = encode(FIXTURE_ADDRESS.as_slice());
        let filter = encode_all([FIXTURE_ADDRESS.as_slice(), FIXTURE_TOPIC.as_slice()]);

        assert!(!is_candidate(&address_only, &filter));
        assert!(is_candidate(&filter, &address_only));
    }

    #[test]
    fn test_zero_filter_matches_zero_record() {
        assert!(is_candidate(&Bloom::ZERO, &Bloom::ZERO));
    }

    #[test]
    fn test_unrelated_key_is_not_candidate() {
        let record = encode(address!("1111111111111111111111111111111111111111").as_slice());
        let filter = encode(FIXTURE_ADDRESS.as_slice());

        assert!(!is_candidate(&record, &filter));
    }
}
