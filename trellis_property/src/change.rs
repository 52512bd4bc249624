// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::value::{ErasedValue, PropertyValue};

/// One published property change.
///
/// `old` is `None` only for the synthetic change a
/// [`ObserveMode::CurrentFirst`] observer receives on subscription.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    /// The value before the write, if this is a real change.
    pub old: Option<ErasedValue>,
    /// The value after the write.
    pub new: ErasedValue,
}

impl Change {
    /// A change carrying only the current value.
    #[must_use]
    pub fn current(value: ErasedValue) -> Self {
        Self {
            old: None,
            new: value,
        }
    }

    /// Returns `true` for the synthetic current-value emission.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.old.is_none()
    }

    /// The new value as a `T`, if it is one.
    #[must_use]
    pub fn new_as<T: PropertyValue>(&self) -> Option<&T> {
        self.new.downcast_ref()
    }

    /// The old value as a `T`, if there is one and it is a `T`.
    #[must_use]
    pub fn old_as<T: PropertyValue>(&self) -> Option<&T> {
        self.old.as_ref().and_then(ErasedValue::downcast_ref)
    }
}

/// How a new observer joins a change stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObserveMode {
    /// Only future changes are delivered.
    #[default]
    ChangesOnly,
    /// The current value is delivered once, synchronously, as a synthetic
    /// change before any live change.
    CurrentFirst,
}
