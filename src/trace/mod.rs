// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Call trace trees and exact call matching
//!
//! A transaction's top-level input often is not the call a caller cares about:
//! proxies, routers, multicall aggregators and relayers forward the real call
//! one or more hops down. This module models the recorded execution tree (the
//! geth `callTracer` output) and finds the first call into a target contract
//! whose selector is in a given set.
//!
//! - [`CallNode`] - one recorded call, owning its sub-calls
//! - [`CallMatcher`] - target address plus selector set
//! - [`find_call`] - pre-order search returning the matching call's input
//!
//! # Examples
//!
//! ```rust,ignore
//! use bloomscan::trace::{CallMatcher, CallNode};
//!
//! let root = CallNode::from_json(&trace_json)?;
//! let matcher = CallMatcher::new(factory, [deploy_pool_selector])?;
//!
//! match matcher.find(&root) {
//!     Some(call) => println!("deploy_pool input: {}", call.input),
//!     None => println!("transaction never called the factory"),
//! }
//! ```

use alloy_primitives::{Address, Bytes, Selector};
use alloy_rpc_types_trace::geth::CallFrame;
use serde::Deserialize;

use crate::config::constants::SELECTOR_LEN;
use crate::errors::TraceError;

pub mod matcher;

pub use matcher::{find_call, CallMatcher};

/// Kind of a recorded call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Ordinary message call
    Call,
    /// Call executing the callee's code in the caller's context
    DelegateCall,
    /// Read-only call
    StaticCall,
    /// Legacy variant of delegate call
    CallCode,
    /// Contract creation
    Create,
    /// Contract creation at a salted address
    Create2,
    /// Self-destruct value transfer
    SelfDestruct,
    /// Any frame type this crate does not know about
    Other,
}

impl CallKind {
    /// Maps a geth frame `type` string such as `"DELEGATECALL"`.
    pub fn from_frame_type(typ: &str) -> Self {
        match typ.to_ascii_uppercase().as_str() {
            "CALL" => CallKind::Call,
            "DELEGATECALL" => CallKind::DelegateCall,
            "STATICCALL" => CallKind::StaticCall,
            "CALLCODE" => CallKind::CallCode,
            "CREATE" => CallKind::Create,
            "CREATE2" => CallKind::Create2,
            "SELFDESTRUCT" => CallKind::SelfDestruct,
            _ => CallKind::Other,
        }
    }
}

/// One recorded call in a transaction's execution tree.
///
/// The root is the transaction's outer call. Children are owned by value in
/// the order they were made; there are no parent links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    /// Caller
    pub from: Address,
    /// Callee; absent only for creations that failed before an address existed
    pub to: Option<Address>,
    /// Call data
    pub input: Bytes,
    /// Return data
    pub output: Bytes,
    /// Frame type
    pub kind: CallKind,
    /// Sub-calls, in call order
    pub calls: Vec<CallNode>,
}

impl CallNode {
    /// Decodes a call tree from `callTracer` JSON text.
    ///
    /// Nesting is limited only by memory, so traces as deep as the EVM call
    /// depth limit decode.
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();

        let frame = CallFrame::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
            .map_err(|e| TraceError::decode(e.to_string()))?;
        deserializer
            .end()
            .map_err(|e| TraceError::decode(e.to_string()))?;

        Ok(frame.into())
    }

    /// Function selector of this call, if the input is long enough to have one.
    pub fn selector(&self) -> Option<Selector> {
        selector_of(&self.input)
    }

    /// Depth-first, pre-order iterator over this node and all descendants.
    ///
    /// Uses an explicit stack, so arbitrarily deep trees do not recurse.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of calls in the tree, including this one.
    pub fn call_count(&self) -> usize {
        self.iter().count()
    }

    /// Deepest nesting level below this node (0 for a leaf).
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.calls.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

impl<'a> IntoIterator for &'a CallNode {
    type Item = &'a CallNode;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<CallFrame> for CallNode {
    /// Converts a geth call frame, children included, without recursing.
    fn from(root: CallFrame) -> Self {
        let mut ancestors: Vec<(CallNode, std::vec::IntoIter<CallFrame>)> = Vec::new();
        let mut current = split_frame(root);

        loop {
            if let Some(child) = current.1.next() {
                ancestors.push(current);
                current = split_frame(child);
                continue;
            }
            let (node, _) = current;
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.0.calls.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }
}

/// Node for `frame` with no children yet, plus the children to convert.
fn split_frame(frame: CallFrame) -> (CallNode, std::vec::IntoIter<CallFrame>) {
    let CallFrame {
        from,
        to,
        input,
        output,
        calls,
        typ,
        ..
    } = frame;

    let node = CallNode {
        from,
        to,
        input,
        output: output.unwrap_or_default(),
        kind: CallKind::from_frame_type(&typ),
        calls: Vec::with_capacity(calls.len()),
    };
    (node, calls.into_iter())
}

impl Drop for CallNode {
    fn drop(&mut self) {
        // Flatten the subtree so dropping a deep chain does not recurse
        let mut pending = std::mem::take(&mut self.calls);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.calls);
        }
    }
}

/// Pre-order traversal of a call tree, see [`CallNode::iter`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    stack: Vec<&'a CallNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a CallNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reversed so the first child is popped next
        self.stack.extend(node.calls.iter().rev());
        Some(node)
    }
}

/// First four bytes of call data.
pub(crate) fn selector_of(input: &[u8]) -> Option<Selector> {
    input.get(..SELECTOR_LEN).map(Selector::from_slice)
}
