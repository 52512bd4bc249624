// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronous multicast publish/subscribe.
//!
//! A [`Subject`] keeps its subscribers as weak references; the strong side
//! lives in the [`Subscription`] returned to the caller. Dropping or
//! disposing the subscription therefore unsubscribes, and nothing the
//! subject holds can keep a subscriber alive.
//!
//! Delivery runs in registration order, to completion, before
//! [`Subject::emit`] returns. The subscriber list is not borrowed while
//! callbacks run, so a callback may subscribe, unsubscribe, or emit again.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// A synchronous multicast publisher of `&T` values.
///
/// Cloning a `Subject` yields another handle to the same subscriber list.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use trellis_property::Subject;
///
/// let subject = Subject::<i32>::new();
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
/// let mut sub = subject.subscribe(move |v| sink.set(*v));
///
/// subject.emit(&7);
/// assert_eq!(seen.get(), 7);
///
/// sub.dispose();
/// subject.emit(&8);
/// assert_eq!(seen.get(), 7);
/// ```
pub struct Subject<T: ?Sized + 'static> {
    subscribers: Rc<RefCell<Vec<CallbackWeak<T>>>>,
}

impl<T: ?Sized + 'static> Subject<T> {
    /// Creates a subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Registers `callback` and returns the handle that keeps it alive.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription::from_guard(strong)
    }

    /// Delivers `value` to every live subscriber, in registration order.
    ///
    /// Subscribers added during delivery first hear the next emission.
    pub fn emit(&self, value: &T) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of subscribers whose handles are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Returns `true` when no live subscriber is registered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.subscriber_count() == 0
    }
}

impl<T: ?Sized + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Handle for a live subscription.
///
/// Dropping the handle unsubscribes. [`Subscription::dispose`] does the same
/// eagerly and may be called any number of times.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// A subscription that holds nothing.
    pub fn empty() -> Self {
        Self { guard: None }
    }

    /// Wraps any value whose drop ends the subscription.
    pub fn from_guard<G: 'static>(guard: G) -> Self {
        Self {
            guard: Some(Box::new(guard)),
        }
    }

    /// Bundles several subscriptions into one handle.
    pub fn join(subscriptions: impl IntoIterator<Item = Self>) -> Self {
        let live: Vec<Self> = subscriptions
            .into_iter()
            .filter(Self::is_active)
            .collect();
        if live.is_empty() {
            Self::empty()
        } else {
            Self::from_guard(live)
        }
    }

    /// Ends the subscription. Calling this again is a no-op.
    pub fn dispose(&mut self) {
        self.guard = None;
    }

    /// Returns `true` until the subscription is disposed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
