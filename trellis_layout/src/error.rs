// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_property::PropertyError;

use crate::types::{NodeId, NodeKind};

/// Errors raised by [`Tree`](crate::Tree) operations.
///
/// Structural errors are raised when the child is assigned, never later
/// during layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// The id refers to a removed node.
    #[error("{0:?} is not a live node")]
    StaleNode(NodeId),
    /// The node already holds as many children as its kind allows.
    #[error("a {kind} accepts at most {capacity} child node(s)")]
    SlotsExceeded {
        /// Kind of the parent.
        kind: NodeKind,
        /// Its capacity.
        capacity: usize,
    },
    /// `set_child` was used on a kind that does not have exactly one slot.
    #[error("a {0} does not have a single child slot")]
    NotSingleSlot(NodeKind),
    /// The child is already attached somewhere.
    #[error("{child:?} already has a parent")]
    AlreadyParented {
        /// The child being attached.
        child: NodeId,
    },
    /// The child is the parent or one of its ancestors.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The would-be parent.
        parent: NodeId,
        /// The would-be child.
        child: NodeId,
    },
    /// No property of that name exists for the node's kind.
    #[error("a {kind} has no property named `{name}`")]
    UnknownProperty {
        /// Kind of the node searched.
        kind: NodeKind,
        /// The name looked up.
        name: String,
    },
    /// Rendering was requested before the node was arranged.
    #[error("{0:?} must be arranged before it is rendered")]
    NotArranged(NodeId),
    /// A property read or write failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
}
