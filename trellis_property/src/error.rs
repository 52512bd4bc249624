// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::id::PropertyId;

/// Errors raised by the registry and by property stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The `(owner, name)` pair was registered before.
    #[error("property `{owner}.{name}` is already registered")]
    AlreadyRegistered {
        /// Owner type name.
        owner: &'static str,
        /// Property name.
        name: &'static str,
    },
    /// Every `u16` id is taken.
    #[error("too many properties registered (max {max})")]
    CapacityExceeded {
        /// The maximum number of registrations.
        max: usize,
    },
    /// The id does not belong to this registry.
    #[error("property {0} is not registered")]
    Unregistered(PropertyId),
    /// A value of the wrong type was written to a property.
    #[error("property `{property}` holds `{expected}` but was given `{found}`")]
    TypeMismatch {
        /// Name of the property written to.
        property: &'static str,
        /// The registered value type.
        expected: &'static str,
        /// The type that was supplied.
        found: &'static str,
    },
}
