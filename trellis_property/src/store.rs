// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse property storage.
//!
//! [`PropertyStore`] keeps the values explicitly set on one object, plus the
//! change streams of the properties someone observes.
//!
//! # Implementation
//!
//! Following the `WinUI` approach, values live in a sorted vector with binary
//! search rather than a hash map. This provides:
//!
//! - Better cache locality (contiguous memory)
//! - Lower memory overhead (no hash buckets)
//! - O(log n) lookup, which is fast for typical property counts (5-20)
//! - Inline storage for small property sets via `SmallVec`
//!
//! The store never publishes on its own. A write returns the [`Change`] it
//! made, and the owner decides when to hand it to [`PropertyStore::stream`].

use smallvec::SmallVec;

use crate::change::Change;
use crate::error::PropertyError;
use crate::id::{Property, PropertyId};
use crate::registry::PropertyRegistry;
use crate::stream::Subject;
use crate::value::{ErasedValue, PropertyValue};

/// Default inline capacity for property entries.
///
/// Most nodes set fewer than 8 properties.
const INLINE_CAPACITY: usize = 8;

/// Per-object sparse storage for property values and their change streams.
///
/// # Example
///
/// ```rust
/// use trellis_property::{PropertyMetadataBuilder, PropertyRegistry, PropertyStore};
///
/// let mut registry = PropertyRegistry::new();
/// let width = registry
///     .register("Layout", "Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// let mut store = PropertyStore::<u32>::new(1);
/// assert_eq!(store.get(width, &registry).unwrap(), 0.0);
///
/// let change = store.set(width, 100.0, &registry).unwrap().unwrap();
/// assert_eq!(change.old_as::<f64>(), Some(&0.0));
/// assert_eq!(change.new_as::<f64>(), Some(&100.0));
///
/// // Writing the same value again is not a change.
/// assert!(store.set(width, 100.0, &registry).unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct PropertyStore<K> {
    /// Local values, sorted by [`PropertyId`] for binary search lookup.
    entries: SmallVec<[(PropertyId, ErasedValue); INLINE_CAPACITY]>,
    /// Change streams, created on first observation, sorted by [`PropertyId`].
    streams: Vec<(PropertyId, Subject<Change>)>,
    owner: K,
}

impl<K: Copy + Eq> PropertyStore<K> {
    /// Creates a new property store for the given owner key.
    #[must_use]
    pub fn new(owner: K) -> Self {
        Self {
            entries: SmallVec::new(),
            streams: Vec::new(),
            owner,
        }
    }

    /// Returns the owner key of this store.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns `true` if no properties have explicit values set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of properties with explicit values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the property IDs that have values set, in id order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    #[inline]
    fn find_entry(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns the explicitly set value, if any.
    #[must_use]
    pub fn get_local<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.get_local_erased(property.id())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the explicitly set value, type-erased.
    #[must_use]
    pub fn get_local_erased(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find_entry(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if the property has an explicit value.
    #[must_use]
    #[inline]
    pub fn has_local(&self, id: PropertyId) -> bool {
        self.find_entry(id).is_ok()
    }

    /// Returns the effective value: the local value, or the registered default.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Unregistered`] if `property` is not in `registry`, and
    /// [`PropertyError::TypeMismatch`] if it was registered with another type.
    pub fn get<T: PropertyValue>(
        &self,
        property: Property<T>,
        registry: &PropertyRegistry,
    ) -> Result<T, PropertyError> {
        if let Some(value) = self.get_local(property) {
            return Ok(value.clone());
        }
        if let Some(metadata) = registry.get_metadata(property) {
            return Ok(metadata.default_value().clone());
        }
        let registration = registry.registration(property.id())?;
        Err(PropertyError::TypeMismatch {
            property: registration.name(),
            expected: registration.type_name(),
            found: std::any::type_name::<T>(),
        })
    }

    /// Returns the effective value, type-erased.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Unregistered`] if `id` is not in `registry`.
    pub fn get_erased(
        &self,
        id: PropertyId,
        registry: &PropertyRegistry,
    ) -> Result<ErasedValue, PropertyError> {
        match self.get_local_erased(id) {
            Some(value) => Ok(value.clone()),
            None => Ok(registry.registration(id)?.default_erased()),
        }
    }

    /// Stores a typed value. See [`PropertyStore::set_erased`].
    ///
    /// # Errors
    ///
    /// Same as [`PropertyStore::set_erased`].
    pub fn set<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
    ) -> Result<Option<Change>, PropertyError> {
        self.set_erased(property.id(), ErasedValue::new(value), registry)
    }

    /// Coerces and stores `value`, returning the change if the effective value
    /// moved.
    ///
    /// The comparison is by value equality against the effective value, so
    /// writing the default to an unset property is not a change either.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Unregistered`] for an unknown id, and
    /// [`PropertyError::TypeMismatch`] when `value` has the wrong type. Nothing
    /// is stored in either case.
    pub fn set_erased(
        &mut self,
        id: PropertyId,
        value: ErasedValue,
        registry: &PropertyRegistry,
    ) -> Result<Option<Change>, PropertyError> {
        let registration = registry.registration(id)?;
        let value = registration.coerce_erased(value)?;
        let old = match self.get_local_erased(id) {
            Some(old) => old.clone(),
            None => registration.default_erased(),
        };
        if old == value {
            return Ok(None);
        }
        match self.find_entry(id) {
            Ok(idx) => self.entries[idx].1 = value.clone(),
            Err(idx) => self.entries.insert(idx, (id, value.clone())),
        }
        Ok(Some(Change {
            old: Some(old),
            new: value,
        }))
    }

    /// Removes the local value, falling back to the default.
    ///
    /// Returns a change only when the default differs from the removed value.
    ///
    /// # Errors
    ///
    /// [`PropertyError::Unregistered`] for an unknown id.
    pub fn clear(
        &mut self,
        id: PropertyId,
        registry: &PropertyRegistry,
    ) -> Result<Option<Change>, PropertyError> {
        let default = registry.registration(id)?.default_erased();
        let Ok(idx) = self.find_entry(id) else {
            return Ok(None);
        };
        let (_, old) = self.entries.remove(idx);
        if old == default {
            Ok(None)
        } else {
            Ok(Some(Change {
                old: Some(old),
                new: default,
            }))
        }
    }

    /// Returns the change stream for `id`, creating it on first use.
    pub fn stream(&mut self, id: PropertyId) -> Subject<Change> {
        match self.streams.binary_search_by_key(&id, |(pid, _)| *pid) {
            Ok(idx) => self.streams[idx].1.clone(),
            Err(idx) => {
                let subject = Subject::new();
                self.streams.insert(idx, (id, subject.clone()));
                subject
            }
        }
    }

    /// Returns the change stream for `id` if anyone ever observed it.
    #[must_use]
    pub fn existing_stream(&self, id: PropertyId) -> Option<Subject<Change>> {
        self.streams
            .binary_search_by_key(&id, |(pid, _)| *pid)
            .ok()
            .map(|idx| self.streams[idx].1.clone())
    }
}
