// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration-time member accessors, looked up by name at bind time.
//!
//! Each model type is registered once, the same way properties are: every
//! member name maps to typed getter, setter or observable closures, erased to
//! work on `&dyn Any` and [`ErasedValue`].

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use hashbrown::HashMap;
use trellis_layout::DataContext;
use trellis_property::{ErasedValue, PropertyValue, Subject, Subscription};

use crate::error::BindingFault;
use crate::notify::{Notifier, Notify};

type Getter = Box<dyn Fn(&dyn Any) -> Option<ErasedValue>>;
/// Returns `false` when the model or the value has the wrong type.
type Setter = Box<dyn Fn(&dyn Any, &ErasedValue) -> bool>;
type Sink = Rc<dyn Fn(ErasedValue)>;
type Observer = Box<dyn Fn(&dyn Any, Sink) -> Option<Subscription>>;
type NotifierOf = fn(&dyn Any) -> Option<&Notifier>;

struct Member {
    value_type: &'static str,
    get: Option<Getter>,
    set: Option<Setter>,
    observe: Option<Observer>,
}

struct TypeMembers {
    type_name: &'static str,
    notifier: Option<NotifierOf>,
    members: HashMap<&'static str, Member>,
}

fn notifier_of<M: Notify>(model: &dyn Any) -> Option<&Notifier> {
    model.downcast_ref::<M>().map(Notify::notifier)
}

/// Member accessors for every model type bindings can read.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use trellis_binding::Accessors;
/// use trellis_layout::DataContext;
/// use trellis_property::ErasedValue;
///
/// struct Person {
///     name: RefCell<String>,
/// }
///
/// let mut accessors = Accessors::new();
/// accessors.register::<Person>().property(
///     "Name",
///     |p| p.name.borrow().clone(),
///     |p, v| *p.name.borrow_mut() = v,
/// );
///
/// let ctx = DataContext::new(Rc::new(Person { name: RefCell::new("Ada".into()) }));
/// accessors
///     .set(&ctx, "Name", &ErasedValue::new("Grace".to_string()))
///     .unwrap();
/// let name = accessors.get(&ctx, "Name").unwrap();
/// assert_eq!(name.downcast_ref::<String>().map(String::as_str), Some("Grace"));
/// ```
#[derive(Default)]
pub struct Accessors {
    types: HashMap<TypeId, TypeMembers>,
}

impl Accessors {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or extends) the member table of `M`.
    pub fn register<M: Any>(&mut self) -> TypeBuilder<'_, M> {
        let entry = self
            .types
            .entry(TypeId::of::<M>())
            .or_insert_with(|| TypeMembers {
                type_name: type_name::<M>(),
                notifier: None,
                members: HashMap::new(),
            });
        TypeBuilder {
            entry,
            marker: PhantomData,
        }
    }

    /// Like [`Accessors::register`], and also lets bindings watch `M`'s
    /// [`Notifier`] to follow member changes.
    pub fn register_notifying<M: Notify>(&mut self) -> TypeBuilder<'_, M> {
        let builder = self.register::<M>();
        builder.entry.notifier = Some(notifier_of::<M>);
        builder
    }

    /// Returns `true` if `M` has a member table.
    #[must_use]
    pub fn is_registered<M: Any>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<M>())
    }

    fn members(&self, context: &DataContext) -> Result<&TypeMembers, BindingFault> {
        self.types
            .get(&context.model_type())
            .ok_or(BindingFault::UnknownModel {
                model: context.model_type_name(),
            })
    }

    fn member<'a>(
        &'a self,
        context: &DataContext,
        name: &str,
    ) -> Result<(&'a TypeMembers, &'a Member), BindingFault> {
        let members = self.members(context)?;
        let member = members
            .members
            .get(name)
            .ok_or_else(|| BindingFault::MissingMember {
                model: members.type_name,
                member: name.to_owned(),
            })?;
        Ok((members, member))
    }

    /// Reads a member of the context's model.
    ///
    /// # Errors
    ///
    /// [`BindingFault::UnknownModel`], [`BindingFault::MissingMember`] and
    /// [`BindingFault::NotReadable`].
    pub fn get(&self, context: &DataContext, member: &str) -> Result<ErasedValue, BindingFault> {
        let (members, entry) = self.member(context, member)?;
        entry
            .get
            .as_ref()
            .and_then(|get| get(context.as_any()))
            .ok_or_else(|| BindingFault::NotReadable {
                model: members.type_name,
                member: member.to_owned(),
            })
    }

    /// Writes a member of the context's model.
    ///
    /// # Errors
    ///
    /// [`BindingFault::UnknownModel`], [`BindingFault::MissingMember`],
    /// [`BindingFault::NotWritable`] and [`BindingFault::TypeMismatch`].
    pub fn set(
        &self,
        context: &DataContext,
        member: &str,
        value: &ErasedValue,
    ) -> Result<(), BindingFault> {
        let (members, entry) = self.member(context, member)?;
        let set = entry.set.as_ref().ok_or_else(|| BindingFault::NotWritable {
            model: members.type_name,
            member: member.to_owned(),
        })?;
        if set(context.as_any(), value) {
            Ok(())
        } else {
            Err(BindingFault::TypeMismatch {
                name: member.to_owned(),
                expected: entry.value_type,
                found: value.type_name(),
            })
        }
    }

    /// Calls `callback` each time the model announces that `member` changed.
    ///
    /// A model registered without a notifier never announces anything, and
    /// gets an empty subscription.
    ///
    /// # Errors
    ///
    /// [`BindingFault::UnknownModel`] and [`BindingFault::MissingMember`].
    pub fn watch(
        &self,
        context: &DataContext,
        member: &str,
        callback: impl Fn() + 'static,
    ) -> Result<Subscription, BindingFault> {
        let (members, _) = self.member(context, member)?;
        let Some(notifier) = members.notifier.and_then(|of| of(context.as_any())) else {
            return Ok(Subscription::empty());
        };
        let member = member.to_owned();
        Ok(notifier.subscribe(move |changed| {
            if changed == member {
                callback();
            }
        }))
    }

    /// Forwards every value the observable `member` produces to `callback`.
    ///
    /// # Errors
    ///
    /// [`BindingFault::UnknownModel`], [`BindingFault::MissingMember`] and
    /// [`BindingFault::NotObservable`].
    pub fn observe(
        &self,
        context: &DataContext,
        member: &str,
        callback: impl Fn(ErasedValue) + 'static,
    ) -> Result<Subscription, BindingFault> {
        let (members, entry) = self.member(context, member)?;
        entry
            .observe
            .as_ref()
            .and_then(|observe| observe(context.as_any(), Rc::new(callback)))
            .ok_or_else(|| BindingFault::NotObservable {
                model: members.type_name,
                member: member.to_owned(),
            })
    }
}

impl fmt::Debug for Accessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.types.values().map(|t| t.type_name))
            .finish()
    }
}

/// Adds members to one model type's table.
pub struct TypeBuilder<'a, M> {
    entry: &'a mut TypeMembers,
    marker: PhantomData<fn(&M)>,
}

impl<M: Any> TypeBuilder<'_, M> {
    fn insert(&mut self, name: &'static str, member: Member) {
        self.entry.members.insert(name, member);
    }

    /// A readable and writable member.
    ///
    /// The setter receives the model by shared reference, so models keep
    /// their state in cells. A model with a [`Notifier`] should announce the
    /// change from the setter.
    pub fn property<T: PropertyValue>(
        mut self,
        name: &'static str,
        get: impl Fn(&M) -> T + 'static,
        set: impl Fn(&M, T) + 'static,
    ) -> Self {
        self.insert(
            name,
            Member {
                value_type: type_name::<T>(),
                get: Some(getter(get)),
                set: Some(Box::new(move |model: &dyn Any, value: &ErasedValue| {
                    match (model.downcast_ref::<M>(), value.downcast_ref::<T>()) {
                        (Some(model), Some(value)) => {
                            set(model, value.clone());
                            true
                        }
                        _ => false,
                    }
                })),
                observe: None,
            },
        );
        self
    }

    /// A member that can only be read.
    pub fn read_only<T: PropertyValue>(
        mut self,
        name: &'static str,
        get: impl Fn(&M) -> T + 'static,
    ) -> Self {
        self.insert(
            name,
            Member {
                value_type: type_name::<T>(),
                get: Some(getter(get)),
                set: None,
                observe: None,
            },
        );
        self
    }

    /// A member that is a stream of values.
    pub fn observable<T: PropertyValue>(
        mut self,
        name: &'static str,
        stream: impl Fn(&M) -> Subject<T> + 'static,
    ) -> Self {
        self.insert(
            name,
            Member {
                value_type: type_name::<T>(),
                get: None,
                set: None,
                observe: Some(Box::new(move |model: &dyn Any, sink: Sink| {
                    let model = model.downcast_ref::<M>()?;
                    let forward = move |value: &T| sink(ErasedValue::new(value.clone()));
                    Some(stream(model).subscribe(forward))
                })),
            },
        );
        self
    }
}

fn getter<M: Any, T: PropertyValue>(get: impl Fn(&M) -> T + 'static) -> Getter {
    Box::new(move |model: &dyn Any| {
        model.downcast_ref::<M>().map(|m| ErasedValue::new(get(m)))
    })
}

impl<M> fmt::Debug for TypeBuilder<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBuilder")
            .field("model", &self.entry.type_name)
            .field("members", &self.entry.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Counter {
        count: Cell<u32>,
        notifier: Notifier,
        ticks: Subject<u32>,
    }

    impl Notify for Counter {
        fn notifier(&self) -> &Notifier {
            &self.notifier
        }
    }

    struct Plain;

    fn accessors() -> Accessors {
        let mut accessors = Accessors::new();
        accessors
            .register_notifying::<Counter>()
            .property(
                "Count",
                |c| c.count.get(),
                |c, v| {
                    c.count.set(v);
                    c.notifier.notify("Count");
                },
            )
            .read_only("Doubled", |c| c.count.get() * 2)
            .observable("Ticks", |c| c.ticks.clone());
        accessors.register::<Plain>().read_only("Answer", |_| 42_u32);
        accessors
    }

    fn counter() -> (Rc<Counter>, DataContext) {
        let model = Rc::new(Counter::default());
        let ctx = DataContext::new(Rc::clone(&model));
        (model, ctx)
    }

    #[test]
    fn get_and_set_by_name() {
        let accessors = accessors();
        let (model, ctx) = counter();

        accessors.set(&ctx, "Count", &ErasedValue::new(7_u32)).unwrap();
        assert_eq!(model.count.get(), 7);
        assert_eq!(
            accessors.get(&ctx, "Doubled").unwrap(),
            ErasedValue::new(14_u32)
        );
    }

    #[test]
    fn faults_name_the_problem() {
        let accessors = accessors();
        let (_model, ctx) = counter();

        assert!(matches!(
            accessors.get(&ctx, "Missing"),
            Err(BindingFault::MissingMember { .. })
        ));
        assert!(matches!(
            accessors.set(&ctx, "Doubled", &ErasedValue::new(1_u32)),
            Err(BindingFault::NotWritable { .. })
        ));
        assert!(matches!(
            accessors.get(&ctx, "Ticks"),
            Err(BindingFault::NotReadable { .. })
        ));
        assert!(matches!(
            accessors.observe(&ctx, "Count", |_| {}),
            Err(BindingFault::NotObservable { .. })
        ));
        assert_eq!(
            accessors.set(&ctx, "Count", &ErasedValue::new("seven")),
            Err(BindingFault::TypeMismatch {
                name: "Count".into(),
                expected: type_name::<u32>(),
                found: type_name::<&str>(),
            })
        );

        let stranger = DataContext::new(Rc::new(String::new()));
        assert!(matches!(
            accessors.get(&stranger, "Count"),
            Err(BindingFault::UnknownModel { .. })
        ));
    }

    #[test]
    fn watch_filters_by_member_name() {
        let accessors = accessors();
        let (model, ctx) = counter();
        let hits = Rc::new(Cell::new(0));
        let count = Rc::clone(&hits);
        let _sub = accessors
            .watch(&ctx, "Count", move || count.set(count.get() + 1))
            .unwrap();

        model.notifier.notify("Other");
        accessors.set(&ctx, "Count", &ErasedValue::new(1_u32)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn models_without_a_notifier_are_never_watched() {
        let accessors = accessors();
        let ctx = DataContext::new(Rc::new(Plain));
        let sub = accessors.watch(&ctx, "Answer", || {}).unwrap();
        assert!(!sub.is_active());
    }

    #[test]
    fn observe_forwards_stream_values() {
        let accessors = accessors();
        let (model, ctx) = counter();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = accessors
            .observe(&ctx, "Ticks", move |v| {
                sink.borrow_mut().push(v.to_typed::<u32>().unwrap());
            })
            .unwrap();

        model.ticks.emit(&1);
        model.ticks.emit(&2);
        drop(sub);
        model.ticks.emit(&3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
