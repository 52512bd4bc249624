// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! This module provides [`PropertyMetadata`] for storing property configuration
//! and [`PropertyMetadataBuilder`] for ergonomic construction.

use std::fmt;

use crate::value::PropertyValue;

bitflags::bitflags! {
    /// What a change to a property invalidates on the node that owns it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Affects: u8 {
        /// The node's desired size and bounds, and those of every ancestor.
        const LAYOUT = 0b0000_0001;
        /// Only the node's painted output.
        const RENDER = 0b0000_0010;
    }
}

/// Callback for coercing a property value before it's stored.
///
/// The callback receives the proposed value and returns the value to store.
/// Change detection compares the coerced value.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Metadata for a property.
///
/// # Example
///
/// ```rust
/// use trellis_property::{Affects, PropertyMetadataBuilder};
///
/// let metadata = PropertyMetadataBuilder::new(100.0_f64)
///     .affects(Affects::LAYOUT)
///     .build();
///
/// assert_eq!(metadata.default_value(), &100.0);
/// assert!(metadata.affects().contains(Affects::LAYOUT));
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    affects: Affects,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata with the given default value, no invalidation and no
    /// coercion.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            affects: Affects::empty(),
            coerce_callback: None,
        }
    }

    /// Returns a reference to the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns what a change to this property invalidates.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> Affects {
        self.affects
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        if let Some(callback) = &self.coerce_callback {
            callback(value)
        } else {
            value
        }
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("affects", &self.affects)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// ```rust
/// use trellis_property::{Affects, PropertyMetadataBuilder};
///
/// let thickness = PropertyMetadataBuilder::new(0.0_f64)
///     .affects(Affects::LAYOUT | Affects::RENDER)
///     .coerce(|v: f64| v.max(0.0))
///     .build();
/// assert_eq!(thickness.coerce(-3.0), 0.0);
/// ```
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    default_value: T,
    affects: Affects,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("default_value", &self.default_value)
            .field("affects", &self.affects)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a new builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            affects: Affects::empty(),
            coerce_callback: None,
        }
    }

    /// Sets what a change to this property invalidates.
    #[must_use]
    pub fn affects(mut self, affects: Affects) -> Self {
        self.affects = affects;
        self
    }

    /// Sets a callback to coerce values before they are stored.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default_value: self.default_value,
            affects: self.affects,
            coerce_callback: self.coerce_callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults() {
        let metadata = PropertyMetadata::new(42_i32);
        assert_eq!(metadata.default_value(), &42);
        assert!(metadata.affects().is_empty());
        assert!(!metadata.has_coerce_callback());
        assert_eq!(metadata.coerce(7), 7);
    }

    #[test]
    fn builder_sets_flags_and_coercion() {
        let metadata = PropertyMetadataBuilder::new(0.0_f64)
            .affects(Affects::LAYOUT | Affects::RENDER)
            .coerce(|v| v.clamp(0.0, 100.0))
            .build();

        assert!(metadata.affects().contains(Affects::LAYOUT));
        assert!(metadata.affects().contains(Affects::RENDER));
        assert_eq!(metadata.coerce(-10.0), 0.0);
        assert_eq!(metadata.coerce(50.0), 50.0);
        assert_eq!(metadata.coerce(150.0), 100.0);
    }

    #[test]
    fn metadata_debug() {
        let metadata = PropertyMetadataBuilder::new(42_i32)
            .affects(Affects::RENDER)
            .build();

        let debug = format!("{metadata:?}");
        assert!(debug.contains("PropertyMetadata"), "{debug}");
        assert!(debug.contains("42"), "{debug}");
        assert!(debug.contains("RENDER"), "{debug}");
    }
}
