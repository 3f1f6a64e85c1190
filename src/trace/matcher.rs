// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Exact matching of calls by target address and selector

use std::collections::HashSet;

use alloy_primitives::{Address, Bytes, Selector};

use super::{selector_of, CallNode};
use crate::errors::TraceError;

/// Finds the first call into `target` whose selector is in `selectors`.
///
/// Traverses the tree depth-first in pre-order: a node is checked before its
/// children, and children in the order they were called. Returns the input of
/// the first match, or `None` if no call in the tree matches.
///
/// # Examples
///
/// ```rust,ignore
/// use bloomscan::trace::{find_call, CallNode};
///
/// let root = CallNode::from_json(&trace_json)?;
/// if let Some(input) = find_call(&root, factory, &[deploy_pool_selector]) {
///     println!("deploy_pool called with {input}");
/// }
/// ```
pub fn find_call<'a>(
    root: &'a CallNode,
    target: Address,
    selectors: &[Selector],
) -> Option<&'a Bytes> {
    root.iter()
        .find(|node| {
            node.to == Some(target)
                && node
                    .selector()
                    .is_some_and(|selector| selectors.contains(&selector))
        })
        .map(|node| &node.input)
}

/// A call target: a contract address and the selectors of interest.
///
/// Shared by the forward lookup of a transaction's top-level call and the
/// fallback search through its call trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMatcher {
    target: Address,
    selectors: HashSet<Selector>,
}

impl CallMatcher {
    /// Creates a matcher for calls into `target` with any of `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidInput`] if `selectors` is empty, since
    /// such a matcher could never match.
    pub fn new(
        target: Address,
        selectors: impl IntoIterator<Item = Selector>,
    ) -> Result<Self, TraceError> {
        let selectors: HashSet<_> = selectors.into_iter().collect();
        if selectors.is_empty() {
            return Err(TraceError::invalid_input(format!(
                "no selectors given for call target {target}"
            )));
        }
        Ok(Self { target, selectors })
    }

    /// Contract the matched call must be made to.
    pub fn target(&self) -> Address {
        self.target
    }

    /// Returns whether `selector` is one of the accepted selectors.
    pub fn accepts(&self, selector: &Selector) -> bool {
        self.selectors.contains(selector)
    }

    /// Accepted selectors, in no particular order.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    /// Returns whether a call to `to` with `input` matches.
    pub fn matches_call(&self, to: Option<Address>, input: &[u8]) -> bool {
        to == Some(self.target) && selector_of(input).is_some_and(|s| self.accepts(&s))
    }

    /// Returns whether `node` itself matches, ignoring its children.
    pub fn matches(&self, node: &CallNode) -> bool {
        self.matches_call(node.to, &node.input)
    }

    /// First matching node in pre-order, see [`find_call`].
    pub fn find<'a>(&self, root: &'a CallNode) -> Option<&'a CallNode> {
        root.iter().find(|node| self.matches(node))
    }
}
