// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Binding: live links between node properties and their sources.
//!
//! A loader describes bindings as [`BindingDeclaration`]s. A [`Binder`] turns
//! each into an [`ActiveBinding`] that keeps the target property in sync:
//!
//! - [`BindingSource::DataContext`] follows a member of the target node's data
//!   context, re-binding whenever the context changes. With
//!   [`BindingDirection::SOURCE_FOLLOWS_TARGET`] it also writes target changes
//!   back to the model.
//! - [`BindingSource::Ancestor`] follows a property of another node, usually
//!   the templated parent. It is one-way.
//! - [`BindingSource::Observable`] forwards the values of an observable member
//!   of the data context.
//!
//! Models are read through [`Accessors`], a name-keyed table of typed
//! closures registered once per model type. A model that implements
//! [`Notify`] announces member changes through its [`Notifier`].
//!
//! Setup problems are returned as [`BindError`]. Problems found while a
//! binding runs are [`BindingFault`]s: they are logged with `tracing`,
//! published on [`Binder::faults`], and do not affect other bindings.

mod accessors;
mod binder;
mod declaration;
mod error;
mod notify;

pub use accessors::{Accessors, TypeBuilder};
pub use binder::{ActiveBinding, Binder, BindingKey};
pub use declaration::{BindingDeclaration, BindingDirection, BindingSource};
pub use error::{BindError, BindingFault};
pub use notify::{Notifier, Notify};
