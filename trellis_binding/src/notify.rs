// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::any::Any;

use trellis_property::{Subject, Subscription};

/// Property-changed publisher owned by a model.
///
/// A model calls [`Notifier::notify`] with a member name after that member
/// changed. Bindings that follow the member re-read it through
/// [`Accessors`](crate::Accessors).
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    changed: Subject<str>,
}

impl Notifier {
    /// A notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces that `member` changed.
    pub fn notify(&self, member: &str) {
        self.changed.emit(member);
    }

    /// Calls `callback` with the name of every member that changes.
    pub fn subscribe(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        self.changed.subscribe(callback)
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.changed.subscriber_count()
    }
}

/// A model that announces its own member changes.
pub trait Notify: Any {
    /// The model's change publisher.
    fn notifier(&self) -> &Notifier;
}
