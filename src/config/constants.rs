//! Fixed constants of the log Bloom index
//!
//! The filter width and hash count follow Ethereum's receipt log Bloom
//! (Yellow Paper, section 4.3.1) and are not tunable.

/// Size of one Bloom value, and of one archive record, in bytes.
pub const BLOOM_RECORD_SIZE: usize = 256;

/// Size of one Bloom value in bits.
pub const BLOOM_BITS: usize = BLOOM_RECORD_SIZE * 8;

/// Number of bit positions derived from each search key.
pub const BITS_PER_KEY: usize = 3;

/// Mask applied to each 16-bit hash slice, keeping 11 bits (`0..=2047`).
pub const BIT_INDEX_MASK: u16 = (BLOOM_BITS - 1) as u16;

/// Offsets into the keccak-256 hash of each big-endian 2-byte slice.
pub const HASH_SLICE_OFFSETS: [usize; BITS_PER_KEY] = [0, 2, 4];

/// Length of a function selector.
pub const SELECTOR_LEN: usize = 4;

/// Search keys of a known query, used by the fixture tests and as an example.
pub mod fixtures {
    use alloy_primitives::{address, b256, Address, BlockNumber, B256};

    /// Contract whose logs the fixture query looks for.
    pub const FIXTURE_ADDRESS: Address = address!("0c0e5f2ff0ff18a3be9b835635039256dc4b4963");

    /// Event signature (topic0) the fixture query looks for.
    pub const FIXTURE_TOPIC: B256 =
        b256!("a307f5d0802489baddec443058a63ce115756de9020e2b07d3e2cd2f21269e2a");

    /// First block of the fixture scan.
    pub const FIXTURE_FROM_BLOCK: BlockNumber = 17_371_439;
}

#[allow(clippy::assertions_on_constants)]
const _: () = assert!(BLOOM_RECORD_SIZE.is_power_of_two());
