// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request pacing
//!
//! Public RPC endpoints rate limit aggressively. Every remote request issued by
//! the [`InputResolver`](crate::InputResolver) and the
//! [`LogCollector`](crate::LogCollector) is preceded by a call to
//! [`Pacer::pace`], so the caller decides how requests are spaced.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::trace;

/// Delay strategy applied before each remote request.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits until the next request may be issued.
    async fn pace(&self);
}

/// Sleeps a fixed interval before each request.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use bloomscan::IntervalPacer;
///
/// let pacer = IntervalPacer::new(Some(Duration::from_secs(1)));
/// assert_eq!(pacer.delay(), Some(Duration::from_secs(1)));
///
/// assert_eq!(IntervalPacer::none().delay(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalPacer {
    delay: Option<Duration>,
}

impl IntervalPacer {
    /// Creates a pacer sleeping `delay` before each request, if set.
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay: delay.filter(|delay| !delay.is_zero()),
        }
    }

    /// A pacer that never waits.
    pub fn none() -> Self {
        Self { delay: None }
    }

    /// Interval slept before each request.
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pace(&self) {
        if let Some(delay) = self.delay {
            trace!(delay_ms = delay.as_millis(), "Pacing request");
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl<T: Pacer + ?Sized> Pacer for std::sync::Arc<T> {
    async fn pace(&self) {
        (**self).pace().await
    }
}
