// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layout tree: node identifiers, kinds and states.

use std::fmt;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On create, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId`
/// still refers to a live node. Stale ids never alias a different live node
/// because the generation must match.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.0, self.1)
    }
}

/// Owner name of the properties every node kind shares.
pub const BASE_OWNER: &str = "Layout";

/// The closed set of layout policies a node can have.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Single child, deflated by padding and a uniform border.
    Border,
    /// Children placed in rows and columns.
    Grid,
    /// Children stacked along one axis.
    StackPanel,
    /// Leaf showing a string.
    TextBlock,
    /// Leaf filled with its background.
    Rectangle,
    /// Leaf marking where a named template is spliced in.
    Placeholder,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Border,
        Self::Grid,
        Self::StackPanel,
        Self::TextBlock,
        Self::Rectangle,
        Self::Placeholder,
    ];

    /// The owner name this kind's own properties are registered under.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Border => "Border",
            Self::Grid => "Grid",
            Self::StackPanel => "StackPanel",
            Self::TextBlock => "TextBlock",
            Self::Rectangle => "Rectangle",
            Self::Placeholder => "Placeholder",
        }
    }

    /// Parses a markup element name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Owners searched, most derived first, when a property is named on this kind.
    #[must_use]
    pub const fn owners(self) -> [&'static str; 2] {
        [self.name(), BASE_OWNER]
    }

    /// How many children this kind accepts.
    #[must_use]
    pub const fn slots(self) -> Slots {
        match self {
            Self::Border => Slots::Single,
            Self::Grid | Self::StackPanel => Slots::Many,
            Self::TextBlock | Self::Rectangle | Self::Placeholder => Slots::None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Child capacity of a [`NodeKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slots {
    /// A leaf.
    None,
    /// At most one child; assigning replaces.
    Single,
    /// Any number of children.
    Many,
}

impl Slots {
    /// The maximum child count, `None` when unbounded.
    #[must_use]
    pub const fn capacity(self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::Single => Some(1),
            Self::Many => None,
        }
    }
}

/// Where a node is in the measure/arrange cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LayoutState {
    /// Needs a measure pass.
    #[default]
    Unmeasured,
    /// Has a valid desired size for its last available size.
    Measured,
    /// Has valid visual bounds and can be rendered.
    Arranged,
}

/// Stacking axis of a [`NodeKind::StackPanel`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Children run top to bottom.
    #[default]
    Vertical,
    /// Children run left to right.
    Horizontal,
}

/// Counters of policy work actually done, cache hits excluded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Number of measure policies run.
    pub measure_passes: u64,
    /// Number of arrange policies run.
    pub arrange_passes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("Button"), None);
    }

    #[test]
    fn slot_capacities() {
        assert_eq!(NodeKind::Border.slots().capacity(), Some(1));
        assert_eq!(NodeKind::Grid.slots().capacity(), None);
        assert_eq!(NodeKind::TextBlock.slots().capacity(), Some(0));
    }

    #[test]
    fn owners_search_the_kind_before_the_base() {
        assert_eq!(NodeKind::Grid.owners(), ["Grid", "Layout"]);
    }
}
