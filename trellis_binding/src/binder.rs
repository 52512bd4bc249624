// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turns [`BindingDeclaration`]s into live subscriptions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use tracing::{debug, warn};
use trellis_layout::{DataContext, NodeId, Tree, TreeError, WeakTree};
use trellis_property::{
    Change, ErasedValue, ObserveMode, PropertyError, PropertyId, Subject, Subscription,
};

use crate::accessors::Accessors;
use crate::declaration::{BindingDeclaration, BindingDirection, BindingSource};
use crate::error::{BindError, BindingFault};

/// Identifies a binding: at most one is live per target property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BindingKey {
    /// The target node.
    pub target: NodeId,
    /// The target property.
    pub property: PropertyId,
}

/// The subscriptions realizing one declaration.
pub struct ActiveBinding {
    subscription: Subscription,
    context: Option<Rc<ContextSlot>>,
}

impl ActiveBinding {
    /// Releases every subscription. Calling this again is a no-op.
    pub fn dispose(&mut self) {
        self.subscription.dispose();
        if let Some(context) = self.context.take() {
            context.clear();
        }
    }

    /// Returns `true` until the binding is disposed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl Drop for ActiveBinding {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ActiveBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveBinding")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// The subscriptions that belong to the current data context.
///
/// A context change may arrive while an earlier one is still being set up
/// (a push can write the context of the same node). Each change takes a new
/// generation, and a setup only commits if no newer change started meanwhile.
#[derive(Default)]
struct ContextSlot {
    generation: Cell<u64>,
    current: RefCell<Subscription>,
}

impl ContextSlot {
    fn begin(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let previous = self.current.replace(Subscription::empty());
        drop(previous);
        generation
    }

    fn commit(&self, generation: u64, subscription: Subscription) {
        if self.generation.get() == generation {
            *self.current.borrow_mut() = subscription;
        }
    }

    fn clear(&self) {
        self.begin();
    }
}

/// Everything a binding callback needs, without keeping the tree alive.
#[derive(Clone)]
struct Link {
    tree: WeakTree,
    target: NodeId,
    property: PropertyId,
    accessors: Rc<Accessors>,
    faults: Subject<BindingFault>,
}

impl Link {
    fn report(&self, fault: BindingFault) {
        warn!(target_node = ?self.target, property = %self.property, %fault, "binding fault");
        self.faults.emit(&fault);
    }

    fn push(&self, value: ErasedValue) {
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        match tree.set_erased(self.target, self.property, value) {
            Ok(_) => {}
            Err(TreeError::StaleNode(node)) => debug!(?node, "binding target is gone"),
            Err(TreeError::Property(PropertyError::TypeMismatch {
                property,
                expected,
                found,
            })) => self.report(BindingFault::TypeMismatch {
                name: property.to_owned(),
                expected,
                found,
            }),
            Err(other) => self.report(BindingFault::Tree(other)),
        }
    }

    fn refresh(&self, context: &DataContext, member: &str) {
        match self.accessors.get(context, member) {
            Ok(value) => self.push(value),
            Err(fault) => self.report(fault),
        }
    }

    fn write_back(&self, context: &DataContext, member: &str, value: &ErasedValue) {
        if let Err(fault) = self.accessors.set(context, member, value) {
            self.report(fault);
        }
    }

    /// Links the target to `member` of a non-null context.
    fn follow_member(
        &self,
        context: &DataContext,
        member: &str,
        direction: BindingDirection,
    ) -> Subscription {
        let mut subscriptions = Vec::new();
        if direction.contains(BindingDirection::TARGET_FOLLOWS_SOURCE) {
            match self.accessors.get(context, member) {
                Ok(value) => self.push(value),
                Err(fault) => {
                    self.report(fault);
                    return Subscription::empty();
                }
            }
            let link = self.clone();
            let (model, name) = (context.clone(), member.to_owned());
            match self
                .accessors
                .watch(context, member, move || link.refresh(&model, &name))
            {
                Ok(subscription) => subscriptions.push(subscription),
                Err(fault) => self.report(fault),
            }
        }
        if direction.contains(BindingDirection::SOURCE_FOLLOWS_TARGET)
            && let Some(tree) = self.tree.upgrade()
        {
            let link = self.clone();
            let (model, name) = (context.clone(), member.to_owned());
            let observed = tree.observe(
                self.target,
                self.property,
                ObserveMode::ChangesOnly,
                move |change: &Change| link.write_back(&model, &name, &change.new),
            );
            match observed {
                Ok(subscription) => subscriptions.push(subscription),
                Err(TreeError::StaleNode(node)) => debug!(?node, "binding target is gone"),
                Err(other) => self.report(BindingFault::Tree(other)),
            }
        }
        Subscription::join(subscriptions)
    }

    fn forward_observable(&self, context: &DataContext, member: &str) -> Subscription {
        let link = self.clone();
        match self
            .accessors
            .observe(context, member, move |value| link.push(value))
        {
            Ok(subscription) => subscription,
            Err(fault) => {
                self.report(fault);
                Subscription::empty()
            }
        }
    }
}

/// A declaration with its names resolved.
enum Plan {
    Member(String),
    Ancestor(NodeId, PropertyId),
    Observable(String),
}

/// Owns the live bindings of one tree.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use trellis_binding::{Accessors, Binder, BindingDeclaration, BindingDirection, Notifier, Notify};
/// use trellis_layout::{Catalog, DataContext, NodeKind, Tree};
///
/// #[derive(Default)]
/// struct Person {
///     name: RefCell<String>,
///     notifier: Notifier,
/// }
///
/// impl Notify for Person {
///     fn notifier(&self) -> &Notifier {
///         &self.notifier
///     }
/// }
///
/// let mut accessors = Accessors::new();
/// accessors.register_notifying::<Person>().property(
///     "Name",
///     |p| p.name.borrow().clone(),
///     |p, v| {
///         *p.name.borrow_mut() = v;
///         p.notifier.notify("Name");
///     },
/// );
///
/// let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
/// let label = tree.create(NodeKind::TextBlock);
/// let mut binder = Binder::new(tree.clone(), Rc::new(accessors));
/// binder
///     .bind(&BindingDeclaration::data_context(label, "Text", "Name", BindingDirection::ONE_WAY))
///     .unwrap();
///
/// let ada = Rc::new(Person::default());
/// *ada.name.borrow_mut() = "Ada".into();
/// tree.set_data_context(label, Some(DataContext::new(Rc::clone(&ada)))).unwrap();
/// assert_eq!(tree.get(label, tree.props().text).unwrap(), "Ada");
/// ```
pub struct Binder {
    tree: Tree,
    accessors: Rc<Accessors>,
    faults: Subject<BindingFault>,
    active: Rc<RefCell<Bindings>>,
    _removals: Subscription,
}

type Bindings = HashMap<BindingKey, ActiveBinding>;

/// Takes the bindings matching `pred` out of `active`. They are dropped by the
/// caller once the borrow has ended.
fn extract(
    active: &RefCell<Bindings>,
    mut pred: impl FnMut(&BindingKey) -> bool,
) -> Vec<ActiveBinding> {
    active
        .borrow_mut()
        .extract_if(|key, _| pred(key))
        .map(|(_, binding)| binding)
        .collect()
}

impl Binder {
    /// A binder with no bindings.
    ///
    /// Bindings whose target node is removed from `tree` are disposed as part
    /// of the removal.
    #[must_use]
    pub fn new(tree: Tree, accessors: Rc<Accessors>) -> Self {
        let active = Rc::new(RefCell::new(Bindings::new()));
        let weak = Rc::downgrade(&active);
        let removals = tree.on_removed(move |ids| {
            let Some(active) = weak.upgrade() else {
                return;
            };
            let released = extract(&active, |key| ids.contains(&key.target));
            if !released.is_empty() {
                debug!(count = released.len(), "released bindings of removed nodes");
            }
        });
        Self {
            tree,
            accessors,
            faults: Subject::new(),
            active,
            _removals: removals,
        }
    }

    /// The tree whose properties are bound.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The member accessors used to read data contexts.
    #[must_use]
    pub fn accessors(&self) -> &Rc<Accessors> {
        &self.accessors
    }

    /// The fault channel. Every runtime fault is published here after it is
    /// logged.
    #[must_use]
    pub fn faults(&self) -> &Subject<BindingFault> {
        &self.faults
    }

    /// Makes `declaration` live, replacing any binding with the same key.
    ///
    /// Everything named in the declaration is resolved before the previous
    /// binding is disposed, so a failed call leaves it in place.
    ///
    /// # Errors
    ///
    /// [`BindError::Tree`] for a stale node or an unknown property name, and
    /// [`BindError::UnsupportedPath`] for an empty or dotted path.
    pub fn bind(&mut self, declaration: &BindingDeclaration) -> Result<BindingKey, BindError> {
        let target = declaration.target;
        let property = self
            .tree
            .lookup_property(target, &declaration.target_property)?;
        let key = BindingKey { target, property };

        let plan = match &declaration.source {
            BindingSource::DataContext { path } => {
                if path.is_empty() || path.contains('.') {
                    return Err(BindError::UnsupportedPath(path.clone()));
                }
                Plan::Member(path.clone())
            }
            BindingSource::Ancestor { node, property } => {
                Plan::Ancestor(*node, self.tree.lookup_property(*node, property)?)
            }
            BindingSource::Observable { member } => Plan::Observable(member.clone()),
        };

        let previous = self.active.borrow_mut().remove(&key);
        if let Some(mut previous) = previous {
            debug!(node = ?target, %property, "replacing binding");
            previous.dispose();
        }

        let link = Link {
            tree: self.tree.downgrade(),
            target,
            property,
            accessors: Rc::clone(&self.accessors),
            faults: self.faults.clone(),
        };
        let direction = declaration.direction;
        let binding = match plan {
            Plan::Member(member) => self.bind_to_context(link, move |link, context| {
                link.follow_member(context, &member, direction)
            })?,
            Plan::Ancestor(node, source) => self.bind_ancestor(link, node, source, direction)?,
            Plan::Observable(member) => self.bind_to_context(link, move |link, context| {
                link.forward_observable(context, &member)
            })?,
        };
        self.active.borrow_mut().insert(key, binding);
        Ok(key)
    }

    /// Binds every declaration in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`Binder::bind`].
    pub fn bind_all<'a>(
        &mut self,
        declarations: impl IntoIterator<Item = &'a BindingDeclaration>,
    ) -> Result<Vec<BindingKey>, BindError> {
        declarations
            .into_iter()
            .map(|declaration| self.bind(declaration))
            .collect()
    }

    fn bind_ancestor(
        &self,
        link: Link,
        source: NodeId,
        source_property: PropertyId,
        direction: BindingDirection,
    ) -> Result<ActiveBinding, BindError> {
        if direction.contains(BindingDirection::SOURCE_FOLLOWS_TARGET) {
            debug!(
                target_node = ?link.target,
                "ancestor bindings are one-way; SOURCE_FOLLOWS_TARGET ignored"
            );
        }
        let subscription = if direction.contains(BindingDirection::TARGET_FOLLOWS_SOURCE) {
            self.tree.observe(
                source,
                source_property,
                ObserveMode::CurrentFirst,
                move |change: &Change| link.push(change.new.clone()),
            )?
        } else {
            Subscription::empty()
        };
        Ok(ActiveBinding {
            subscription,
            context: None,
        })
    }

    /// Re-runs `connect` for every non-null data context of the target.
    fn bind_to_context(
        &self,
        link: Link,
        connect: impl Fn(&Link, &DataContext) -> Subscription + 'static,
    ) -> Result<ActiveBinding, BindError> {
        let slot = Rc::new(ContextSlot::default());
        let context = Rc::clone(&slot);
        let (node, property) = (link.target, link.property);
        let on_context = move |change: &Change| {
            let generation = slot.begin();
            match change.new_as::<Option<DataContext>>() {
                Some(Some(model)) => {
                    debug!(?node, %property, model = model.model_type_name(), "rebinding");
                    let subscription = connect(&link, model);
                    slot.commit(generation, subscription);
                }
                _ => debug!(?node, %property, "data context cleared"),
            }
        };
        let subscription = self.tree.observe(
            node,
            self.tree.props().data_context.id(),
            ObserveMode::CurrentFirst,
            on_context,
        )?;
        Ok(ActiveBinding {
            subscription,
            context: Some(context),
        })
    }

    /// Disposes the binding with this key. Returns whether one existed.
    pub fn unbind(&mut self, key: BindingKey) -> bool {
        let removed = self.active.borrow_mut().remove(&key);
        match removed {
            Some(mut binding) => {
                binding.dispose();
                true
            }
            None => false,
        }
    }

    /// Disposes every binding that targets `node`. Returns how many there were.
    pub fn unbind_node(&mut self, node: NodeId) -> usize {
        extract(&self.active, |key| key.target == node).len()
    }

    /// Disposes every binding that targets `root` or one of its descendants.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] if `root` was removed.
    pub fn unbind_subtree(&mut self, root: NodeId) -> Result<usize, TreeError> {
        let nodes = self.tree.descendants(root)?;
        Ok(nodes.into_iter().map(|node| self.unbind_node(node)).sum())
    }

    /// Disposes the bindings whose target node no longer exists.
    ///
    /// Removal through the tree already releases them, so this only finds
    /// bindings that outlived a removal made while they were being created.
    pub fn prune(&mut self) -> usize {
        let tree = &self.tree;
        extract(&self.active, |key| !tree.is_alive(key.target)).len()
    }

    /// Disposes every binding.
    pub fn clear(&mut self) {
        let released = std::mem::take(&mut *self.active.borrow_mut());
        drop(released);
    }

    /// Returns `true` if a binding with this key is live.
    #[must_use]
    pub fn is_bound(&self, key: BindingKey) -> bool {
        self.active.borrow().contains_key(&key)
    }

    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    /// Returns `true` if no binding is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("tree", &self.tree)
            .field("accessors", &self.accessors)
            .field("bindings", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notifier, Notify};
    use peniko::color::palette::css;
    use trellis_layout::{Catalog, NodeKind};

    #[derive(Default)]
    struct Person {
        name: RefCell<String>,
        notifier: Notifier,
        ticks: Subject<String>,
        writes: Cell<usize>,
    }

    impl Person {
        fn named(name: &str) -> Rc<Self> {
            let person = Self::default();
            *person.name.borrow_mut() = name.to_owned();
            Rc::new(person)
        }

        fn set_name(&self, name: String) {
            if *self.name.borrow() == name {
                return;
            }
            *self.name.borrow_mut() = name;
            self.writes.set(self.writes.get() + 1);
            self.notifier.notify("Name");
        }
    }

    impl Notify for Person {
        fn notifier(&self) -> &Notifier {
            &self.notifier
        }
    }

    struct Fixture {
        tree: Tree,
        binder: Binder,
        label: NodeId,
        faults: Rc<RefCell<Vec<BindingFault>>>,
        _faults_sub: Subscription,
    }

    impl Fixture {
        fn new() -> Self {
            let mut accessors = Accessors::new();
            accessors
                .register_notifying::<Person>()
                .property("Name", |p| p.name.borrow().clone(), Person::set_name)
                .read_only("Length", |p| p.name.borrow().len())
                .observable("Ticks", |p| p.ticks.clone());
            let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
            let label = tree.create(NodeKind::TextBlock);
            let binder = Binder::new(tree.clone(), Rc::new(accessors));
            let faults = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&faults);
            let _faults_sub = binder
                .faults()
                .subscribe(move |f: &BindingFault| sink.borrow_mut().push(f.clone()));
            Self {
                tree,
                binder,
                label,
                faults,
                _faults_sub,
            }
        }

        fn bind_text(&mut self, path: &str, direction: BindingDirection) -> BindingKey {
            self.binder
                .bind(&BindingDeclaration::data_context(
                    self.label, "Text", path, direction,
                ))
                .unwrap()
        }

        fn assign(&self, person: &Rc<Person>) {
            self.tree
                .set_data_context(self.label, Some(DataContext::new(Rc::clone(person))))
                .unwrap();
        }

        fn text(&self) -> String {
            self.tree.get(self.label, self.tree.props().text).unwrap()
        }
    }

    #[test]
    fn one_way_follows_the_context_member() {
        let mut fx = Fixture::new();
        fx.bind_text("Name", BindingDirection::ONE_WAY);

        let ada = Person::named("Ada");
        fx.assign(&ada);
        assert_eq!(fx.text(), "Ada");

        ada.set_name("Grace".into());
        assert_eq!(fx.text(), "Grace");

        fx.tree
            .set(fx.label, fx.tree.props().text, "edited".into())
            .unwrap();
        assert_eq!(*ada.name.borrow(), "Grace", "one-way never writes back");
    }

    #[test]
    fn bound_before_or_after_assignment_is_the_same() {
        let mut fx = Fixture::new();
        let ada = Person::named("Ada");
        fx.assign(&ada);
        fx.bind_text("Name", BindingDirection::ONE_WAY);
        assert_eq!(fx.text(), "Ada");
    }

    #[test]
    fn two_way_writes_back_without_ping_pong() {
        let mut fx = Fixture::new();
        fx.bind_text("Name", BindingDirection::TWO_WAY);
        let text_changes = Rc::new(Cell::new(0));
        let count = Rc::clone(&text_changes);
        let _sub = fx
            .tree
            .observe(
                fx.label,
                fx.tree.props().text.id(),
                ObserveMode::ChangesOnly,
                move |_| count.set(count.get() + 1),
            )
            .unwrap();

        let ada = Person::named("Ada");
        fx.assign(&ada);
        assert_eq!(fx.text(), "Ada");
        assert_eq!(ada.writes.get(), 0, "the initial push is not written back");

        let text = fx.tree.props().text;
        fx.tree.set(fx.label, text, "Grace".into()).unwrap();
        fx.tree.set(fx.label, text, "Linus".into()).unwrap();

        assert_eq!(*ada.name.borrow(), "Linus");
        assert_eq!(ada.writes.get(), 2);
        assert_eq!(text_changes.get(), 3, "Ada, Grace, Linus");
    }

    #[test]
    fn clearing_the_context_keeps_the_last_value() {
        let mut fx = Fixture::new();
        fx.bind_text("Name", BindingDirection::ONE_WAY);
        let ada = Person::named("Ada");
        fx.assign(&ada);

        fx.tree.set_data_context(fx.label, None).unwrap();
        ada.set_name("Grace".into());

        assert_eq!(fx.text(), "Ada");
        assert_eq!(ada.notifier.listener_count(), 0);
    }

    #[test]
    fn a_new_context_replaces_the_old_subscriptions() {
        let mut fx = Fixture::new();
        fx.bind_text("Name", BindingDirection::ONE_WAY);
        let ada = Person::named("Ada");
        let grace = Person::named("Grace");

        fx.assign(&ada);
        fx.assign(&grace);
        assert_eq!(fx.text(), "Grace");
        assert_eq!(ada.notifier.listener_count(), 0);

        ada.set_name("Ignored".into());
        assert_eq!(fx.text(), "Grace");
    }

    #[test]
    fn rebinding_leaves_exactly_one_binding() {
        let mut fx = Fixture::new();
        let first = fx.bind_text("Name", BindingDirection::ONE_WAY);
        let second = fx.bind_text("Name", BindingDirection::ONE_WAY);
        assert_eq!(first, second);
        assert_eq!(fx.binder.len(), 1);

        let ada = Person::named("Ada");
        fx.assign(&ada);
        assert_eq!(ada.notifier.listener_count(), 1, "no duplicate delivery");
    }

    #[test]
    fn runtime_faults_are_published_and_isolated() {
        let mut fx = Fixture::new();
        let other = fx.tree.create(NodeKind::TextBlock);
        fx.bind_text("Missing", BindingDirection::ONE_WAY);
        fx.binder
            .bind(&BindingDeclaration::data_context(
                other,
                "Text",
                "Name",
                BindingDirection::ONE_WAY,
            ))
            .unwrap();

        let ada = Person::named("Ada");
        fx.assign(&ada);
        fx.tree
            .cascade_data_context(other, Some(DataContext::new(Rc::clone(&ada))))
            .unwrap();

        assert!(matches!(
            fx.faults.borrow().as_slice(),
            [BindingFault::MissingMember { member, .. }] if member == "Missing"
        ));
        assert_eq!(fx.tree.get(other, fx.tree.props().text).unwrap(), "Ada");
    }

    #[test]
    fn pushing_the_wrong_type_is_a_fault() {
        let mut fx = Fixture::new();
        fx.bind_text("Length", BindingDirection::ONE_WAY);
        fx.assign(&Person::named("Ada"));

        assert!(matches!(
            fx.faults.borrow().as_slice(),
            [BindingFault::TypeMismatch { name, .. }] if name == "Text"
        ));
        assert_eq!(fx.text(), "");
    }

    #[test]
    fn ancestor_bindings_follow_the_source_node() {
        let mut fx = Fixture::new();
        let props = *fx.tree.props();
        let border = fx.tree.create(NodeKind::Border);
        fx.tree.set_child(border, Some(fx.label)).unwrap();
        fx.tree.set(border, props.border_brush, css::RED).unwrap();

        fx.binder
            .bind(&BindingDeclaration::ancestor(
                fx.label,
                "Foreground",
                border,
                "BorderBrush",
            ))
            .unwrap();
        assert_eq!(fx.tree.get(fx.label, props.foreground).unwrap(), css::RED);

        fx.tree.set(border, props.border_brush, css::GREEN).unwrap();
        assert_eq!(fx.tree.get(fx.label, props.foreground).unwrap(), css::GREEN);
    }

    #[test]
    fn ancestor_bindings_never_write_back() {
        let mut fx = Fixture::new();
        let props = *fx.tree.props();
        let border = fx.tree.create(NodeKind::Border);
        let mut declaration =
            BindingDeclaration::ancestor(fx.label, "Foreground", border, "BorderBrush");
        declaration.direction = BindingDirection::TWO_WAY;
        fx.binder.bind(&declaration).unwrap();

        fx.tree.set(fx.label, props.foreground, css::BLUE).unwrap();
        assert_eq!(
            fx.tree.get(border, props.border_brush).unwrap(),
            css::TRANSPARENT
        );
    }

    #[test]
    fn observable_members_are_forwarded_per_context() {
        let mut fx = Fixture::new();
        fx.binder
            .bind(&BindingDeclaration::observable(fx.label, "Text", "Ticks"))
            .unwrap();
        let ada = Person::named("Ada");
        let grace = Person::named("Grace");

        fx.assign(&ada);
        ada.ticks.emit(&"one".to_string());
        assert_eq!(fx.text(), "one");

        fx.assign(&grace);
        ada.ticks.emit(&"stale".to_string());
        assert_eq!(fx.text(), "one");
        grace.ticks.emit(&"two".to_string());
        assert_eq!(fx.text(), "two");
    }

    #[test]
    fn lookup_errors_are_returned_to_the_caller() {
        let mut fx = Fixture::new();
        let err = fx
            .binder
            .bind(&BindingDeclaration::data_context(
                fx.label,
                "Nope",
                "Name",
                BindingDirection::ONE_WAY,
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::Tree(TreeError::UnknownProperty { .. })
        ));

        let err = fx
            .binder
            .bind(&BindingDeclaration::data_context(
                fx.label,
                "Text",
                "Owner.Name",
                BindingDirection::ONE_WAY,
            ))
            .unwrap_err();
        assert_eq!(err, BindError::UnsupportedPath("Owner.Name".into()));
        assert!(fx.binder.is_empty());
    }

    #[test]
    fn unbinding_is_idempotent_and_stops_updates() {
        let mut fx = Fixture::new();
        let key = fx.bind_text("Name", BindingDirection::ONE_WAY);
        let ada = Person::named("Ada");
        fx.assign(&ada);

        assert!(fx.binder.unbind(key));
        assert!(!fx.binder.unbind(key));
        assert_eq!(fx.binder.unbind_node(fx.label), 0);

        ada.set_name("Grace".into());
        assert_eq!(fx.text(), "Ada");
        assert_eq!(ada.notifier.listener_count(), 0);
    }

    #[test]
    fn subtree_unbinding_and_pruning() {
        let mut fx = Fixture::new();
        let grid = fx.tree.create(NodeKind::Grid);
        fx.tree.append_child(grid, fx.label).unwrap();
        fx.bind_text("Name", BindingDirection::ONE_WAY);
        assert_eq!(fx.binder.unbind_subtree(grid), Ok(1));

        fx.bind_text("Name", BindingDirection::ONE_WAY);
        fx.tree.remove(grid).unwrap();
        assert!(fx.binder.is_empty(), "removal already released it");
        assert_eq!(fx.binder.prune(), 0);
    }

    #[test]
    fn removing_the_target_releases_the_model() {
        let mut fx = Fixture::new();
        let key = fx.bind_text("Name", BindingDirection::TWO_WAY);
        let ada = Person::named("Ada");
        fx.assign(&ada);
        assert_eq!(ada.notifier.listener_count(), 1);

        fx.tree.remove(fx.label).unwrap();
        assert_eq!(ada.notifier.listener_count(), 0);
        assert_eq!(fx.binder.len(), 0);
        assert!(!fx.binder.is_bound(key));
        assert_eq!(Rc::strong_count(&ada), 1);

        ada.set_name("Grace".into());
        assert!(fx.faults.borrow().is_empty());
    }

    #[test]
    fn replacing_the_target_releases_its_bindings() {
        let mut fx = Fixture::new();
        let panel = fx.tree.create(NodeKind::StackPanel);
        fx.tree.append_child(panel, fx.label).unwrap();
        fx.bind_text("Name", BindingDirection::ONE_WAY);
        let ada = Person::named("Ada");
        fx.assign(&ada);

        let fresh = fx.tree.create(NodeKind::TextBlock);
        fx.tree.replace(fx.label, fresh).unwrap();
        assert!(fx.binder.is_empty());
        assert_eq!(ada.notifier.listener_count(), 0);
    }
}
