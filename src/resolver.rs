// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Recovery of the call input behind a matched log
//!
//! Most transactions call the target contract directly, so the transaction's
//! own input is checked first and the (much more expensive) call trace is only
//! requested when the target was reached through a router or proxy.

use alloy_primitives::{Bytes, TxHash};
use tracing::{debug, Instrument};

use crate::errors::TraceError;
use crate::pacing::{IntervalPacer, Pacer};
use crate::source::ChainSource;
use crate::spans;
use crate::trace::CallMatcher;

/// Finds the input of the call into a target contract made by a transaction.
#[derive(Debug, Clone)]
pub struct InputResolver<S, P = IntervalPacer> {
    source: S,
    pacer: P,
}

impl<S: ChainSource> InputResolver<S> {
    /// Creates a resolver that does not pace its requests.
    pub fn new(source: S) -> Self {
        Self::with_pacer(source, IntervalPacer::none())
    }
}

impl<S: ChainSource, P: Pacer> InputResolver<S, P> {
    /// Creates a resolver pacing each request with `pacer`.
    pub fn with_pacer(source: S, pacer: P) -> Self {
        Self { source, pacer }
    }

    /// Chain data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Request pacer.
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Input of the first call matching `matcher` made by `tx_hash`.
    ///
    /// Returns `Ok(None)` when the transaction never made such a call.
    ///
    /// # Errors
    ///
    /// [`TraceError::Fetch`] when a remote lookup fails, and
    /// [`TraceError::Decode`] or [`TraceError::EmptyTrace`] when the node
    /// returns an unusable trace.
    pub async fn resolve(
        &self,
        tx_hash: TxHash,
        matcher: &CallMatcher,
    ) -> Result<Option<Bytes>, TraceError> {
        let span = spans::resolve_input(tx_hash, matcher.target());
        async {
            self.pacer.pace().await;
            let call = self.source.transaction_call(tx_hash).await?;
            if matcher.matches_call(call.to, &call.input) {
                debug!(tx_hash = %tx_hash, "Matched top-level call");
                return Ok(Some(call.input));
            }

            self.pacer.pace().await;
            let root = self.source.call_trace(tx_hash).await?;
            let input = matcher.find(&root).map(|node| node.input.clone());

            debug!(
                tx_hash = %tx_hash,
                calls = root.call_count(),
                found = input.is_some(),
                "Searched call trace"
            );
            Ok(input)
        }
        .instrument(span)
        .await
    }
}
