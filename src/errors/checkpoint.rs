// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for checkpoint persistence.

/// Errors that can occur while loading or saving a checkpoint file.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Error reading or writing the checkpoint file.
    #[error("Checkpoint I/O error at {path}")]
    Io {
        /// Path to the checkpoint file that caused the error
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file exists but is not valid checkpoint JSON.
    #[error("Invalid checkpoint format at {path}")]
    Format {
        /// Path to the checkpoint file that caused the error
        path: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl CheckpointError {
    /// Create an `Io` error for a checkpoint path.
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        CheckpointError::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Create a `Format` error for a checkpoint path.
    pub fn format(path: impl std::fmt::Display, source: serde_json::Error) -> Self {
        CheckpointError::Format {
            path: path.to_string(),
            source,
        }
    }
}
