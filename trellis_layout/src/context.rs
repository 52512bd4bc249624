// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::rc::Rc;

/// The model object a node's bindings read from and write to.
///
/// The host owns the model. A `DataContext` is a cheap, cloneable handle that
/// also remembers the concrete type, so accessors can be looked up without
/// downcasting blindly. Two contexts are equal only if they point at the same
/// model, which means re-assigning the same model is not a change.
///
/// The handle is strong: a node keeps its model alive until the context is
/// cleared or the node is removed.
#[derive(Clone)]
pub struct DataContext {
    model: Rc<dyn Any>,
    type_id: TypeId,
    type_name: &'static str,
}

impl DataContext {
    /// Wraps a shared model.
    #[must_use]
    pub fn new<M: Any>(model: Rc<M>) -> Self {
        Self {
            model,
            type_id: TypeId::of::<M>(),
            type_name: type_name::<M>(),
        }
    }

    /// The model, as `&dyn Any`.
    #[must_use]
    pub fn as_any(&self) -> &dyn Any {
        &*self.model
    }

    /// The [`TypeId`] of the wrapped model.
    #[must_use]
    pub fn model_type(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the wrapped model, for diagnostics.
    #[must_use]
    pub fn model_type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the model as an `Rc<M>` if it is one.
    #[must_use]
    pub fn downcast<M: Any>(&self) -> Option<Rc<M>> {
        Rc::clone(&self.model).downcast::<M>().ok()
    }
}

impl PartialEq for DataContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.model, &other.model)
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataContext").field(&self.type_name).finish()
    }
}
