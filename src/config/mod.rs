// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for bloomscan runs
//!
//! Controls where the Bloom archive starts and how remote requests are paced,
//! globally and per chain.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use bloomscan::ScanConfig;
//!
//! // One second between remote requests, archive starting at block 0
//! let config = ScanConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use bloomscan::ScanConfigBuilder;
//! use std::time::Duration;
//! use alloy_chains::NamedChain;
//!
//! let config = ScanConfigBuilder::with_defaults()
//!     .chain_base_block(NamedChain::Mainnet, 17_000_000)
//!     .chain_request_delay(NamedChain::Arbitrum, Duration::from_millis(100))
//!     .build();
//! ```
//!
//! # Example: Local node (no delays)
//!
//! ```rust
//! use bloomscan::ScanConfig;
//!
//! let config = ScanConfig::minimal();
//! ```

use std::collections::HashMap;
use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::BlockNumber;

use crate::pacing::IntervalPacer;

pub mod constants;

/// Delay between remote requests used by [`ScanConfig::with_common_defaults`].
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Configuration for archive scans and remote lookups
///
/// Use [`ScanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Block number of the archive's first record
    /// Default: 0
    pub base_block: BlockNumber,

    /// Delay before each remote request
    /// Default: 1 second
    pub request_delay: Option<Duration>,

    /// Chain-specific overrides
    pub chain_overrides: HashMap<NamedChain, ChainConfig>,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainConfig {
    /// Override the archive base block for this chain
    pub base_block: Option<BlockNumber>,

    /// Override the request delay for this chain
    pub request_delay: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl ScanConfig {
    /// Create config suited to public RPC endpoints
    ///
    /// Waits [`DEFAULT_REQUEST_DELAY`] before every remote request.
    pub fn with_common_defaults() -> Self {
        Self {
            base_block: 0,
            request_delay: Some(DEFAULT_REQUEST_DELAY),
            chain_overrides: HashMap::new(),
        }
    }

    /// Create minimal config with no delays
    ///
    /// Suitable for tests and local nodes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bloomscan::ScanConfig;
    /// use alloy_chains::NamedChain;
    ///
    /// let config = ScanConfig::minimal();
    /// assert_eq!(config.get_request_delay(NamedChain::Mainnet), None);
    /// ```
    pub fn minimal() -> Self {
        Self {
            base_block: 0,
            request_delay: None,
            chain_overrides: HashMap::new(),
        }
    }

    /// Get effective archive base block for a specific chain
    ///
    /// Returns chain-specific override if set, otherwise returns global default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bloomscan::{ChainConfig, ScanConfig};
    /// use alloy_chains::NamedChain;
    ///
    /// let mut config = ScanConfig::minimal();
    /// config.set_chain_override(
    ///     NamedChain::Mainnet,
    ///     ChainConfig {
    ///         base_block: Some(17_000_000),
    ///         request_delay: None,
    ///     },
    /// );
    ///
    /// assert_eq!(config.get_base_block(NamedChain::Mainnet), 17_000_000);
    /// assert_eq!(config.get_base_block(NamedChain::Base), 0); // Default
    /// ```
    pub fn get_base_block(&self, chain: NamedChain) -> BlockNumber {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.base_block)
            .unwrap_or(self.base_block)
    }

    /// Get effective request delay for a specific chain
    ///
    /// Returns chain-specific override if set, otherwise returns global default.
    pub fn get_request_delay(&self, chain: NamedChain) -> Option<Duration> {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.request_delay)
            .or(self.request_delay)
    }

    /// Pacer applying the effective request delay for `chain`
    pub fn pacer(&self, chain: NamedChain) -> IntervalPacer {
        IntervalPacer::new(self.get_request_delay(chain))
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: NamedChain, config: ChainConfig) {
        self.chain_overrides.insert(chain, config);
    }
}

/// Builder for [`ScanConfig`]
///
/// # Example
///
/// ```rust
/// use bloomscan::ScanConfigBuilder;
/// use alloy_chains::NamedChain;
/// use std::time::Duration;
///
/// let config = ScanConfigBuilder::new()
///     .base_block(10_000_000)
///     .request_delay(Duration::from_millis(500))
///     .chain_request_delay(NamedChain::Base, Duration::from_millis(250))
///     .build();
///
/// assert_eq!(config.get_base_block(NamedChain::Base), 10_000_000);
/// assert_eq!(
///     config.get_request_delay(NamedChain::Base),
///     Some(Duration::from_millis(250))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: ScanConfig::minimal(),
        }
    }

    /// Start with common defaults
    ///
    /// Initializes the builder with the same defaults as [`ScanConfig::with_common_defaults`].
    pub fn with_defaults() -> Self {
        Self {
            config: ScanConfig::with_common_defaults(),
        }
    }

    /// Set global archive base block
    pub fn base_block(mut self, base_block: BlockNumber) -> Self {
        self.config.base_block = base_block;
        self
    }

    /// Set global request delay
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.config.request_delay = Some(delay);
        self
    }

    /// Remove the global request delay
    pub fn no_request_delay(mut self) -> Self {
        self.config.request_delay = None;
        self
    }

    /// Add chain-specific configuration
    pub fn chain_config(mut self, chain: NamedChain, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set archive base block for a specific chain
    pub fn chain_base_block(mut self, chain: NamedChain, base_block: BlockNumber) -> Self {
        let existing = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        self.config.set_chain_override(
            chain,
            ChainConfig {
                base_block: Some(base_block),
                ..existing
            },
        );
        self
    }

    /// Convenience: set request delay for a specific chain
    pub fn chain_request_delay(mut self, chain: NamedChain, delay: Duration) -> Self {
        let existing = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        self.config.set_chain_override(
            chain,
            ChainConfig {
                request_delay: Some(delay),
                ..existing
            },
        );
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ScanConfig {
        self.config
    }
}
