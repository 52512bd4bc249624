// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Property: typed properties with synchronous change streams.
//!
//! This crate is the bottom layer of Trellis. It knows nothing about trees or
//! layout; it provides the pieces those layers store on every node.
//!
//! ## Core Concepts
//!
//! - [`PropertyRegistry`] records each property once: owner type name,
//!   property name, value type, default, and what a change invalidates
//!   ([`Affects`]). Registering the same `(owner, name)` twice is an error.
//! - [`Property<T>`] is the typed, `Copy` handle returned by registration.
//! - [`PropertyStore`] keeps one object's explicitly set values in a sorted
//!   sparse vector. Writes compare against the effective value and return the
//!   [`Change`] they made, if any.
//! - [`Subject`] and [`Subscription`] form the publish/subscribe primitive
//!   that change streams are built from. Delivery is synchronous.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use trellis_property::{
//!     Affects, Change, PropertyMetadataBuilder, PropertyRegistry, PropertyStore,
//! };
//!
//! let mut registry = PropertyRegistry::new();
//! let width = registry
//!     .register(
//!         "Layout",
//!         "Width",
//!         PropertyMetadataBuilder::new(0.0_f64)
//!             .affects(Affects::LAYOUT)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let mut store = PropertyStore::<u32>::new(1);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let _sub = store
//!     .stream(width.id())
//!     .subscribe(move |c: &Change| sink.borrow_mut().push(*c.new_as::<f64>().unwrap()));
//!
//! // The owner publishes whatever the store reports.
//! if let Some(change) = store.set(width, 100.0, &registry).unwrap() {
//!     store.existing_stream(width.id()).unwrap().emit(&change);
//! }
//! assert_eq!(*seen.borrow(), vec![100.0]);
//! ```
//!
//! ## Memory Optimizations
//!
//! | Optimization | Description |
//! |--------------|-------------|
//! | **Sparse storage** | `PropertyStore` only allocates for explicitly set properties |
//! | **Shared defaults** | Default values stored in registry, not per-object |
//! | **Inline storage** | `SmallVec` for small property counts |
//! | **Lazy streams** | A change stream exists only once something observes it |
//! | **`PropertyId` as u16** | Compact property identification |

mod change;
mod error;
mod id;
mod metadata;
mod registry;
mod store;
mod stream;
mod value;

pub use change::{Change, ObserveMode};
pub use error::PropertyError;
pub use id::{Property, PropertyId};
pub use metadata::{Affects, CoerceValueCallback, PropertyMetadata, PropertyMetadataBuilder};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::PropertyStore;
pub use stream::{Subject, Subscription};
pub use value::{ErasedValue, PropertyValue};
