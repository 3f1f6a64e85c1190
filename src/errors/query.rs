// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for building log queries.

use crate::query::TOPIC_POSITIONS;

/// Errors that can occur while building a [`LogQuery`](crate::LogQuery).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A topic position outside the indexed topics of a log.
    #[error("Topic position {position} out of range, logs have {TOPIC_POSITIONS} topic positions")]
    InvalidTopicPosition {
        /// The rejected position
        position: usize,
    },
}

impl QueryError {
    /// Create an `InvalidTopicPosition` error.
    pub fn invalid_topic_position(position: usize) -> Self {
        QueryError::InvalidTopicPosition { position }
    }
}
