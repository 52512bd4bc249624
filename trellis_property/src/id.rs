// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles naming registered properties.
//!
//! Nodes store values under a [`PropertyId`]. Code that knows the value type
//! holds a [`Property<T>`] instead, so `tree.set(node, text, 42)` is rejected
//! by the compiler when `text` carries `String`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Index of one registration in a [`PropertyRegistry`](crate::PropertyRegistry).
///
/// Handed out in registration order, starting at zero, and never reused. The
/// same `(owner, name)` pair always resolves to the same id for the lifetime
/// of its registry.
///
/// ```rust
/// use trellis_property::{PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let text = registry
///     .register("TextBlock", "Text", PropertyMetadataBuilder::new(String::new()).build())
///     .unwrap();
/// assert_eq!(registry.lookup("TextBlock", "Text"), Some(text.id()));
/// assert_eq!(text.id().to_string(), "#0");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Wraps a registry index. Registration is the usual source of ids.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Position of the registration in its registry.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A [`PropertyId`] that remembers its value type.
///
/// Returned by [`PropertyRegistry::register`](crate::PropertyRegistry::register);
/// the typed accessors on stores and trees take it. Erase it with
/// [`Property::id`] when the value type is only known at runtime, as in
/// bindings resolved by name.
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Attaches the value type `T` to `id`.
    ///
    /// Nothing is checked here. Using the handle against a registration of
    /// another type fails later with
    /// [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch).
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped id.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

// `T` is only a marker, so none of these need bounds on it.

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> From<Property<T>> for PropertyId {
    #[inline]
    fn from(property: Property<T>) -> Self {
        property.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropertyMetadataBuilder, PropertyRegistry};

    #[test]
    fn ids_follow_registration_order_across_owners() {
        let mut registry = PropertyRegistry::new();
        let thickness = registry
            .register("Border", "BorderThickness", PropertyMetadataBuilder::new(1.0_f64).build())
            .unwrap();
        let text = registry
            .register("TextBlock", "Text", PropertyMetadataBuilder::new(String::new()).build())
            .unwrap();

        assert_eq!(thickness.id().index(), 0);
        assert_eq!(text.id().index(), 1);
        assert!(thickness.id() < text.id());
        assert_eq!(format!("{:?} {}", text.id(), text.id()), "PropertyId(1) #1");
    }

    #[test]
    fn retyped_handles_find_no_metadata() {
        let mut registry = PropertyRegistry::new();
        let width = registry
            .register("Layout", "Width", PropertyMetadataBuilder::new(0.0_f64).build())
            .unwrap();
        let wrong: Property<String> = Property::from_id(width.id());

        assert_eq!(wrong.id(), PropertyId::from(width));
        assert!(registry.get_metadata(width).is_some());
        assert!(registry.get_metadata(wrong).is_none());
    }

    #[test]
    fn debug_names_the_value_type() {
        let visible: Property<bool> = Property::from_id(PropertyId::new(3));
        let shown = format!("{visible:?}");
        assert!(shown.contains("PropertyId(3)"), "{shown}");
        assert!(shown.contains("bool"), "{shown}");
    }
}
