// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Log search queries
//!
//! A [`LogQuery`] names the contracts and positional topics a caller is
//! looking for. From one query the crate derives both the composite Bloom
//! filter used to prune blocks via the archive and the exact RPC
//! [`Filter`] used to fetch the logs of the blocks that survive.
//!
//! # Examples
//!
//! ```rust
//! use alloy_primitives::{address, b256};
//! use bloomscan::{LogQuery, TopicPosition};
//!
//! let query = LogQuery::new()
//!     .with_address(address!("0c0e5f2ff0ff18a3be9b835635039256dc4b4963"))
//!     .with_topic(
//!         TopicPosition::Topic0,
//!         b256!("a307f5d0802489baddec443058a63ce115756de9020e2b07d3e2cd2f21269e2a"),
//!     );
//!
//! let filter = query.composite_filter();
//! assert_eq!(bloomscan::bloom::count_ones(&filter), 6);
//! ```

use alloy_primitives::{Address, BlockNumber, Bloom, B256};
use alloy_rpc_types::Filter;
use serde::{Deserialize, Serialize};

use crate::bloom::{combine, encode};
use crate::errors::QueryError;

/// Number of indexed topic positions in an EVM log.
pub const TOPIC_POSITIONS: usize = 4;

/// Indexed topic position of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopicPosition {
    /// Event signature
    Topic0,
    /// First indexed argument
    Topic1,
    /// Second indexed argument
    Topic2,
    /// Third indexed argument
    Topic3,
}

impl TopicPosition {
    /// Every position, in order.
    pub const ALL: [TopicPosition; TOPIC_POSITIONS] = [
        TopicPosition::Topic0,
        TopicPosition::Topic1,
        TopicPosition::Topic2,
        TopicPosition::Topic3,
    ];

    /// Index of this position in a log's topic list.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for TopicPosition {
    type Error = QueryError;

    fn try_from(position: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(position)
            .copied()
            .ok_or_else(|| QueryError::invalid_topic_position(position))
    }
}

/// Addresses and positional topics to search logs for.
///
/// Within one position the listed values are alternatives; across positions
/// (and between addresses and topics) every constraint must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    addresses: Vec<Address>,
    topics: [Vec<B256>; TOPIC_POSITIONS],
}

impl LogQuery {
    /// Create an empty query, matching every log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an emitting contract address as an alternative.
    pub fn with_address(mut self, address: Address) -> Self {
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self
    }

    /// Adds a topic alternative at `position`.
    pub fn with_topic(mut self, position: TopicPosition, topic: B256) -> Self {
        let alternatives = &mut self.topics[position.index()];
        if !alternatives.contains(&topic) {
            alternatives.push(topic);
        }
        self
    }

    /// Adds an event signature alternative (topic 0).
    pub fn with_event_signature(self, signature: B256) -> Self {
        self.with_topic(TopicPosition::Topic0, signature)
    }

    /// Contract address alternatives.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Topic alternatives at `position`.
    pub fn topics(&self, position: TopicPosition) -> &[B256] {
        &self.topics[position.index()]
    }

    /// Composite Bloom filter of every constraint with a single alternative.
    ///
    /// A constraint with several alternatives cannot be expressed as one
    /// subset test, so it is left out. Leaving constraints out only admits
    /// more candidate blocks; a block whose logs match the query always
    /// passes.
    pub fn composite_filter(&self) -> Bloom {
        let address = single(&self.addresses).map(|address| encode(address.as_slice()));
        let topics = self
            .topics
            .iter()
            .filter_map(|alternatives| single(alternatives))
            .map(|topic| encode(topic.as_slice()));

        combine(address.into_iter().chain(topics))
    }

    /// RPC filter selecting this query's logs in one block.
    pub fn to_filter(&self, block_number: BlockNumber) -> Filter {
        let mut filter = Filter::new().from_block(block_number).to_block(block_number);

        if !self.addresses.is_empty() {
            filter = filter.address(self.addresses.clone());
        }

        for (position, alternatives) in self.topics.iter().enumerate() {
            if alternatives.is_empty() {
                continue;
            }
            let alternatives = alternatives.clone();
            filter = match position {
                0 => filter.event_signature(alternatives),
                1 => filter.topic1(alternatives),
                2 => filter.topic2(alternatives),
                _ => filter.topic3(alternatives),
            };
        }

        filter
    }
}

fn single<T>(values: &[T]) -> Option<&T> {
    match values {
        [only] => Some(only),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::{count_ones, is_candidate};
    use crate::config::constants::fixtures::{FIXTURE_ADDRESS, FIXTURE_TOPIC};
    use alloy_primitives::address;

    #[test]
    fn test_empty_query_has_zero_filter() {
        assert_eq!(LogQuery::new().composite_filter(), Bloom::ZERO);
    }

    #[test]
    fn test_single_alternatives_are_combined() {
        let query = LogQuery::new()
            .with_address(FIXTURE_ADDRESS)
            .with_event_signature(FIXTURE_TOPIC);

        let expected = combine([
            encode(FIXTURE_ADDRESS.as_slice()),
            encode(FIXTURE_TOPIC.as_slice()),
        ]);
        assert_eq!(query.composite_filter(), expected);
    }

    #[test]
    fn test_multiple_addresses_are_left_out() {
        let other = address!("1111111111111111111111111111111111111111");
        let query = LogQuery::new()
            .with_address(FIXTURE_ADDRESS)
            .with_address(other)
            .with_event_signature(FIXTURE_TOPIC);

        let filter = query.composite_filter();
        assert_eq!(filter, encode(FIXTURE_TOPIC.as_slice()));

        // A block with only the second address and the topic is still a candidate
        let block = combine([encode(other.as_slice()), encode(FIXTURE_TOPIC.as_slice())]);
        assert!(is_candidate(&block, &filter));
    }

    #[test]
    fn test_duplicate_alternatives_collapse() {
        let query = LogQuery::new()
            .with_address(FIXTURE_ADDRESS)
            .with_address(FIXTURE_ADDRESS)
            .with_topic(TopicPosition::Topic2, FIXTURE_TOPIC)
            .with_topic(TopicPosition::Topic2, FIXTURE_TOPIC);

        assert_eq!(query.addresses().len(), 1);
        assert_eq!(query.topics(TopicPosition::Topic2).len(), 1);
        assert_eq!(count_ones(&query.composite_filter()), 6);
    }

    #[test]
    fn test_topic_position_from_index() {
        assert_eq!(TopicPosition::try_from(0), Ok(TopicPosition::Topic0));
        assert_eq!(TopicPosition::try_from(3), Ok(TopicPosition::Topic3));
        assert_eq!(
            TopicPosition::try_from(4),
            Err(QueryError::InvalidTopicPosition { position: 4 })
        );
        for (index, position) in TopicPosition::ALL.into_iter().enumerate() {
            assert_eq!(position.index(), index);
        }
    }

    #[test]
    fn test_positions_are_independent() {
        let query = LogQuery::new()
            .with_event_signature(FIXTURE_TOPIC)
            .with_topic(TopicPosition::Topic3, FIXTURE_TOPIC);

        assert_eq!(query.topics(TopicPosition::Topic0), &[FIXTURE_TOPIC]);
        assert!(query.topics(TopicPosition::Topic1).is_empty());
        assert_eq!(query.topics(TopicPosition::Topic3), &[FIXTURE_TOPIC]);
    }

    #[test]
    fn test_rpc_filter_covers_one_block() {
        let filter = LogQuery::new()
            .with_address(FIXTURE_ADDRESS)
            .with_event_signature(FIXTURE_TOPIC)
            .to_filter(17_371_500);

        assert_eq!(filter.get_from_block(), Some(17_371_500));
        assert_eq!(filter.get_to_block(), Some(17_371_500));
    }
}
