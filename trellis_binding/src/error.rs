// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_layout::TreeError;

/// Failure to set up a binding, returned by [`Binder::bind`](crate::Binder::bind).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The target or ancestor node, or one of their properties, does not exist.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// Data-context paths name exactly one member.
    #[error("`{0}` is not a single member name")]
    UnsupportedPath(String),
}

/// A binding problem found while a binding is live.
///
/// Faults are logged and published on [`Binder::faults`](crate::Binder::faults).
/// They never tear down other bindings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingFault {
    /// The data context holds a model type that was never registered.
    #[error("model type `{model}` has no registered accessors")]
    UnknownModel {
        /// Rust type name of the model.
        model: &'static str,
    },
    /// The model type has no member of that name.
    #[error("`{model}` has no member `{member}`")]
    MissingMember {
        /// Rust type name of the model.
        model: &'static str,
        /// The member looked up.
        member: String,
    },
    /// The member has no getter.
    #[error("`{model}.{member}` is not readable")]
    NotReadable {
        /// Rust type name of the model.
        model: &'static str,
        /// The member.
        member: String,
    },
    /// The member has no setter.
    #[error("`{model}.{member}` is not writable")]
    NotWritable {
        /// Rust type name of the model.
        model: &'static str,
        /// The member.
        member: String,
    },
    /// The member is not an observable stream.
    #[error("`{model}.{member}` is not observable")]
    NotObservable {
        /// Rust type name of the model.
        model: &'static str,
        /// The member.
        member: String,
    },
    /// A value of the wrong type was pushed into a property or member.
    #[error("`{name}` expects `{expected}`, got `{found}`")]
    TypeMismatch {
        /// The property or member written.
        name: String,
        /// Its declared type.
        expected: &'static str,
        /// The type of the value.
        found: &'static str,
    },
    /// Writing the target failed for another reason.
    #[error(transparent)]
    Tree(TreeError),
}
