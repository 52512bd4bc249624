// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;
use trellis_layout::NodeId;

bitflags! {
    /// Which way values flow through a binding.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BindingDirection: u8 {
        /// Source changes are pushed into the target property.
        const TARGET_FOLLOWS_SOURCE = 0b01;
        /// Target changes are written back to the source member.
        const SOURCE_FOLLOWS_TARGET = 0b10;
        /// Source to target only.
        const ONE_WAY = Self::TARGET_FOLLOWS_SOURCE.bits();
        /// Both ways. The initial value comes from the source.
        const TWO_WAY = Self::TARGET_FOLLOWS_SOURCE.bits() | Self::SOURCE_FOLLOWS_TARGET.bits();
    }
}

/// Where a binding reads its values from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingSource {
    /// A member of the target node's data context, re-resolved whenever the
    /// context changes.
    DataContext {
        /// Member name on the model.
        path: String,
    },
    /// A property of another node, typically the templated parent.
    Ancestor {
        /// The source node, fixed at bind time.
        node: NodeId,
        /// Property name on the source node, `Owner.Name` for attached ones.
        property: String,
    },
    /// An observable member of the data context whose values are forwarded.
    Observable {
        /// Member name on the model.
        member: String,
    },
}

/// A request to link a target property to a source, as produced by a loader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingDeclaration {
    /// The node whose property receives values.
    pub target: NodeId,
    /// Name of the target property, resolved on the target's kind.
    pub target_property: String,
    /// Where values come from.
    pub source: BindingSource,
    /// Flow direction. Ancestor and observable sources only honor
    /// [`BindingDirection::TARGET_FOLLOWS_SOURCE`].
    pub direction: BindingDirection,
}

impl BindingDeclaration {
    /// Binds `target_property` to the data-context member `path`.
    pub fn data_context(
        target: NodeId,
        target_property: impl Into<String>,
        path: impl Into<String>,
        direction: BindingDirection,
    ) -> Self {
        Self {
            target,
            target_property: target_property.into(),
            source: BindingSource::DataContext { path: path.into() },
            direction,
        }
    }

    /// Binds `target_property` one-way to `property` on `node`.
    pub fn ancestor(
        target: NodeId,
        target_property: impl Into<String>,
        node: NodeId,
        property: impl Into<String>,
    ) -> Self {
        Self {
            target,
            target_property: target_property.into(),
            source: BindingSource::Ancestor {
                node,
                property: property.into(),
            },
            direction: BindingDirection::ONE_WAY,
        }
    }

    /// Forwards the data context's observable `member` into `target_property`.
    pub fn observable(
        target: NodeId,
        target_property: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            target,
            target_property: target_property.into(),
            source: BindingSource::Observable {
                member: member.into(),
            },
            direction: BindingDirection::ONE_WAY,
        }
    }
}
