// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! This module provides [`PropertyRegistry`] for registering and looking up
//! property metadata by id or by `(owner, name)`.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use hashbrown::HashMap;

use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::metadata::{Affects, PropertyMetadata};
use crate::value::{ErasedValue, PropertyValue};

/// A registration entry for a property.
pub struct PropertyRegistration {
    owner: &'static str,
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Returns the owner type name, such as `"Border"`.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the Rust type name of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns what a change to this property invalidates.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> Affects {
        self.metadata.affects()
    }

    /// Returns the default value, type-erased.
    #[must_use]
    pub fn default_erased(&self) -> ErasedValue {
        self.metadata.default_erased()
    }

    /// Checks the type of `value` and runs it through the coerce callback.
    pub(crate) fn coerce_erased(&self, value: ErasedValue) -> Result<ErasedValue, PropertyError> {
        if value.type_id() != self.type_id {
            return Err(PropertyError::TypeMismatch {
                property: self.name,
                expected: self.type_name,
                found: value.type_name(),
            });
        }
        Ok(self.metadata.coerce_erased(value))
    }
}

impl fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("affects", &self.affects())
            .finish_non_exhaustive()
    }
}

/// A registry of properties.
///
/// Properties are registered once, before any node uses them, and the
/// registry is then shared read-only. Names are scoped by an owner type name,
/// so `Border.Padding` and `Grid.Padding` are distinct.
///
/// # Example
///
/// ```rust
/// use trellis_property::{Affects, PropertyError, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
///
/// let width = registry
///     .register(
///         "Layout",
///         "Width",
///         PropertyMetadataBuilder::new(0.0_f64)
///             .affects(Affects::LAYOUT)
///             .build(),
///     )
///     .unwrap();
///
/// assert_eq!(registry.lookup("Layout", "Width"), Some(width.id()));
/// assert!(registry.affects(width.id()).contains(Affects::LAYOUT));
///
/// let again = registry.register("Layout", "Width", PropertyMetadataBuilder::new(1.0_f64).build());
/// assert!(matches!(again, Err(PropertyError::AlreadyRegistered { .. })));
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_owner: HashMap<&'static str, HashMap<&'static str, PropertyId>>,
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property under `owner` with the given name and metadata.
    ///
    /// Returns a typed [`Property<T>`] handle.
    ///
    /// # Errors
    ///
    /// [`PropertyError::AlreadyRegistered`] if `(owner, name)` is taken, and
    /// [`PropertyError::CapacityExceeded`] once every id is in use.
    pub fn register<T: PropertyValue>(
        &mut self,
        owner: &'static str,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, PropertyError> {
        if self.lookup(owner, name).is_some() {
            return Err(PropertyError::AlreadyRegistered { owner, name });
        }
        let Ok(index) = u16::try_from(self.properties.len()) else {
            return Err(PropertyError::CapacityExceeded {
                max: usize::from(u16::MAX),
            });
        };
        let id = PropertyId::new(index);

        self.properties.push(PropertyRegistration {
            owner,
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            metadata: Box::new(metadata),
        });
        self.by_owner.entry(owner).or_default().insert(name, id);

        Ok(Property::from_id(id))
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by owner and name.
    #[must_use]
    pub fn lookup(&self, owner: &str, name: &str) -> Option<PropertyId> {
        self.by_owner.get(owner)?.get(name).copied()
    }

    /// Looks up `name` under each owner in turn and returns the first hit.
    ///
    /// Pass the most derived owner first, such as `["Border", "Layout"]`.
    #[must_use]
    pub fn lookup_in(&self, owners: &[&str], name: &str) -> Option<PropertyId> {
        owners.iter().find_map(|owner| self.lookup(owner, name))
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(usize::from(id.index()))
    }

    /// Returns the registration for a property, or an error if it is unknown.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Unregistered`] when `id` is not from this registry.
    pub fn registration(&self, id: PropertyId) -> Result<&PropertyRegistration, PropertyError> {
        self.get(id).ok_or(PropertyError::Unregistered(id))
    }

    /// Returns what a change to a property invalidates.
    #[must_use]
    pub fn affects(&self, id: PropertyId) -> Affects {
        self.get(id)
            .map(PropertyRegistration::affects)
            .unwrap_or_default()
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len <= u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self
                    .properties
                    .iter()
                    .map(|r| format!("{}.{}", r.owner, r.name))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

trait ErasedMetadata: Any {
    fn as_any(&self) -> &dyn Any;
    fn affects(&self) -> Affects;
    fn default_erased(&self) -> ErasedValue;
    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue;
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn affects(&self) -> Affects {
        Self::affects(self)
    }

    fn default_erased(&self) -> ErasedValue {
        ErasedValue::new(self.default_value().clone())
    }

    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue {
        if !self.has_coerce_callback() {
            return value;
        }
        match value.to_typed::<T>() {
            Some(typed) => ErasedValue::new(self.coerce(typed)),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;

    #[test]
    fn register_hands_out_sequential_ids() {
        let mut registry = PropertyRegistry::new();
        assert!(registry.is_empty());

        let width = registry
            .register("Layout", "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let height = registry
            .register("Layout", "Height", PropertyMetadata::new(0.0_f64))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(width.id().index(), 0);
        assert_eq!(height.id().index(), 1);
    }

    #[test]
    fn same_name_under_another_owner_is_distinct() {
        let mut registry = PropertyRegistry::new();
        let border = registry
            .register("Border", "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let grid = registry
            .register("Grid", "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();

        assert_ne!(border.id(), grid.id());
        assert_eq!(registry.lookup("Grid", "Padding"), Some(grid.id()));
    }

    #[test]
    fn duplicate_registration_is_a_configuration_error() {
        let mut registry = PropertyRegistry::new();
        registry
            .register("Layout", "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let err = registry
            .register("Layout", "Width", PropertyMetadata::new(0.0_f64))
            .unwrap_err();

        assert_eq!(
            err,
            PropertyError::AlreadyRegistered {
                owner: "Layout",
                name: "Width"
            }
        );
        assert_eq!(registry.len(), 1, "failed registration must not be stored");
    }

    #[test]
    fn lookup_in_prefers_the_first_owner() {
        let mut registry = PropertyRegistry::new();
        let base = registry
            .register("Layout", "Background", PropertyMetadata::new(0_u32))
            .unwrap();
        let text = registry
            .register("TextBlock", "Text", PropertyMetadata::new(String::new()))
            .unwrap();

        assert_eq!(
            registry.lookup_in(&["TextBlock", "Layout"], "Background"),
            Some(base.id())
        );
        assert_eq!(
            registry.lookup_in(&["TextBlock", "Layout"], "Text"),
            Some(text.id())
        );
        assert_eq!(registry.lookup_in(&["Border", "Layout"], "Text"), None);
    }

    #[test]
    fn coerce_erased_checks_type_first() {
        let mut registry = PropertyRegistry::new();
        let thickness = registry
            .register(
                "Border",
                "BorderThickness",
                PropertyMetadataBuilder::new(0.0_f64)
                    .coerce(|v| v.max(0.0))
                    .build(),
            )
            .unwrap();
        let registration = registry.registration(thickness.id()).unwrap();

        let coerced = registration
            .coerce_erased(ErasedValue::new(-4.0_f64))
            .unwrap();
        assert_eq!(coerced.downcast_ref::<f64>(), Some(&0.0));

        let err = registration
            .coerce_erased(ErasedValue::new(String::from("thick")))
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { property: "BorderThickness", .. }));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let registry = PropertyRegistry::new();
        let id = PropertyId::new(9);
        assert_eq!(registry.name(id), None);
        assert!(registry.affects(id).is_empty());
        assert_eq!(
            registry.registration(id).unwrap_err(),
            PropertyError::Unregistered(id)
        );
    }

    #[test]
    fn registry_debug_lists_qualified_names() {
        let mut registry = PropertyRegistry::new();
        registry
            .register("Grid", "Row", PropertyMetadata::new(0_usize))
            .unwrap();

        let debug = format!("{registry:?}");
        assert!(debug.contains("Grid.Row"), "{debug}");
    }
}
