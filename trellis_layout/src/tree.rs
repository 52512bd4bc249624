// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena, structural edits and property access.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use kurbo::{Rect, Size};
use tracing::trace;
use trellis_property::{
    Affects, Change, ErasedValue, ObserveMode, Property, PropertyId, PropertyStore, PropertyValue,
    Subject, Subscription,
};

use crate::catalog::{Catalog, LayoutProperties};
use crate::config::LayoutConfig;
use crate::context::DataContext;
use crate::error::TreeError;
use crate::text::{MonospaceMeasure, TextMeasure};
use crate::types::{LayoutState, LayoutStats, NodeId, NodeKind};

/// A layout tree.
///
/// `Tree` is a cheap handle: clones share the same nodes. Every method takes
/// `&self`, and no internal borrow is held while change streams are
/// published, so observers may read and write the tree from inside their
/// callbacks. Layout passes and [`TextMeasure`] calls do hold the node
/// storage; a text measurer must not call back into the tree.
///
/// ```rust
/// use std::rc::Rc;
/// use kurbo::Size;
/// use trellis_layout::{Catalog, NodeKind, Tree};
///
/// let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
/// let props = *tree.props();
///
/// let border = tree.create(NodeKind::Border);
/// let label = tree.create(NodeKind::TextBlock);
/// tree.set_child(border, Some(label)).unwrap();
/// tree.set(label, props.text, "Ada".to_string()).unwrap();
/// tree.set(border, props.border_thickness, 1.0).unwrap();
///
/// assert_eq!(tree.measure(border, Size::new(80.0, 24.0)).unwrap(), Size::new(5.0, 3.0));
/// ```
#[derive(Clone)]
pub struct Tree {
    shared: Rc<Shared>,
}

/// A non-owning handle to a [`Tree`], for callbacks stored outside it.
#[derive(Clone)]
pub struct WeakTree {
    shared: Weak<Shared>,
}

struct Shared {
    catalog: Rc<Catalog>,
    config: LayoutConfig,
    text: Box<dyn TextMeasure>,
    arena: RefCell<Arena>,
    publishing: RefCell<Vec<InFlight>>,
    removed: Subject<[NodeId]>,
}

/// A change currently being delivered.
struct InFlight {
    node: NodeId,
    property: PropertyId,
    value: ErasedValue,
}

#[derive(Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub(crate) stats: LayoutStats,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) store: PropertyStore<NodeId>,
    pub(crate) layout: LayoutCache,
}

#[derive(Default)]
pub(crate) struct LayoutCache {
    pub(crate) state: LayoutState,
    /// The available size of the last measure, the memoization key.
    pub(crate) available: Option<Size>,
    pub(crate) desired: Size,
    pub(crate) bounds: Rect,
}

impl Arena {
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            (idx, slot.generation)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "more than u32::MAX nodes is not supported"
            )]
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                node: None,
            });
            (idx, 1)
        };
        let id = NodeId::new(idx, generation);
        self.slots[idx as usize].node = Some(Node {
            kind,
            parent: None,
            children: Vec::new(),
            store: PropertyStore::new(id),
            layout: LayoutCache::default(),
        });
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.slots
            .get(id.idx())
            .filter(|slot| slot.generation == id.1)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slots
            .get_mut(id.idx())
            .filter(|slot| slot.generation == id.1)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::StaleNode(id))
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    /// Returns `node` and every ancestor to `Unmeasured`.
    pub(crate) fn invalidate_layout(&mut self, id: NodeId) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Ok(node) = self.node_mut(current) else {
                break;
            };
            node.layout.state = LayoutState::Unmeasured;
            node.layout.available = None;
            cursor = node.parent;
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.node(current).ok().and_then(|n| n.parent);
        }
        false
    }

    /// Checks that `child` may be attached under `parent` as an extra child.
    fn check_attach(&self, parent: NodeId, child: NodeId, extra: bool) -> Result<(), TreeError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyParented { child });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        let kind = parent_node.kind;
        if let Some(capacity) = kind.slots().capacity()
            && extra
            && parent_node.children.len() >= capacity
        {
            return Err(TreeError::SlotsExceeded { kind, capacity });
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) -> Result<Option<(NodeId, usize)>, TreeError> {
        let Some(parent) = self.node_mut(child)?.parent.take() else {
            return Ok(None);
        };
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings.iter().position(|c| *c == child);
        if let Some(index) = index {
            siblings.remove(index);
        }
        self.invalidate_layout(parent);
        Ok(index.map(|index| (parent, index)))
    }

    fn subtree(&self, root: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Frees `root` and its descendants, returning the freed ids in pre-order.
    fn free_subtree(&mut self, root: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let nodes = self.subtree(root)?;
        for id in &nodes {
            if let Some(slot) = self.slots.get_mut(id.idx()) {
                slot.node = None;
                self.free.push(id.0);
            }
        }
        Ok(nodes)
    }
}

/// Builder for a [`Tree`] with non-default configuration.
pub struct TreeBuilder {
    catalog: Rc<Catalog>,
    config: LayoutConfig,
    text: Box<dyn TextMeasure>,
}

impl TreeBuilder {
    /// Sets the layout configuration.
    #[must_use]
    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the text measurement capability.
    #[must_use]
    pub fn text_measure(mut self, text: impl TextMeasure + 'static) -> Self {
        self.text = Box::new(text);
        self
    }

    /// Builds the tree.
    #[must_use]
    pub fn build(self) -> Tree {
        Tree {
            shared: Rc::new(Shared {
                catalog: self.catalog,
                config: self.config,
                text: self.text,
                arena: RefCell::new(Arena::default()),
                publishing: RefCell::new(Vec::new()),
                removed: Subject::new(),
            }),
        }
    }
}

impl fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// A tree with the default configuration and a one-unit monospace text measurer.
    #[must_use]
    pub fn new(catalog: Rc<Catalog>) -> Self {
        Self::builder(catalog).build()
    }

    /// Starts building a tree.
    #[must_use]
    pub fn builder(catalog: Rc<Catalog>) -> TreeBuilder {
        TreeBuilder {
            catalog,
            config: LayoutConfig::default(),
            text: Box::new(MonospaceMeasure::default()),
        }
    }

    /// The shared property catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.shared.catalog
    }

    /// The standard property handles.
    #[must_use]
    pub fn props(&self) -> &LayoutProperties {
        self.shared.catalog.props()
    }

    /// The layout configuration.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.shared.config
    }

    /// The text measurer the tree was built with.
    #[must_use]
    pub fn text_measure(&self) -> &dyn TextMeasure {
        &*self.shared.text
    }

    pub(crate) fn arena(&self) -> &RefCell<Arena> {
        &self.shared.arena
    }

    /// A handle that does not keep the tree alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakTree {
        WeakTree {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Returns `true` if both handles refer to the same tree.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    // --- Structure -----------------------------------------------------------

    /// Creates a detached node of the given kind.
    pub fn create(&self, kind: NodeKind) -> NodeId {
        let id = self.shared.arena.borrow_mut().alloc(kind);
        trace!(?id, %kind, "node created");
        id
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.shared.arena.borrow().node(id).is_ok()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.arena.borrow().live_count()
    }

    /// Returns `true` if the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind of a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn kind(&self, id: NodeId) -> Result<NodeKind, TreeError> {
        Ok(self.shared.arena.borrow().node(id)?.kind)
    }

    /// The parent of a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        Ok(self.shared.arena.borrow().node(id)?.parent)
    }

    /// The children of a node, in paint order.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        Ok(self.shared.arena.borrow().node(id)?.children.clone())
    }

    /// `id` and all its descendants, in pre-order.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.shared.arena.borrow().subtree(id)
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`TreeError::SlotsExceeded`] when `parent` is full, which for a
    /// [`NodeKind::Border`] means it already has a child; use
    /// [`Tree::set_child`] to replace it. Also [`TreeError::AlreadyParented`],
    /// [`TreeError::Cycle`] and [`TreeError::StaleNode`].
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.shared.arena.borrow().node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Inserts `child` at `index` among `parent`'s children, clamped to the end.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::append_child`].
    pub fn insert_child(&self, parent: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        let mut arena = self.shared.arena.borrow_mut();
        arena.check_attach(parent, child, true)?;
        let siblings = &mut arena.node_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        arena.node_mut(child)?.parent = Some(parent);
        arena.invalidate_layout(parent);
        trace!(?parent, ?child, index, "child attached");
        Ok(())
    }

    /// Sets or clears the only child of a single-slot node.
    ///
    /// The previous child, if any, is detached (not removed) and returned.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotSingleSlot`] unless `parent` is a [`NodeKind::Border`],
    /// plus the errors of [`Tree::append_child`] for the new child.
    pub fn set_child(
        &self,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> Result<Option<NodeId>, TreeError> {
        let mut arena = self.shared.arena.borrow_mut();
        let parent_node = arena.node(parent)?;
        if parent_node.kind.slots().capacity() != Some(1) {
            return Err(TreeError::NotSingleSlot(parent_node.kind));
        }
        let previous = parent_node.children.first().copied();
        if previous.is_some() && previous == child {
            return Ok(None);
        }
        if let Some(child) = child {
            arena.check_attach(parent, child, false)?;
        }
        if let Some(previous) = previous {
            arena.unlink(previous)?;
        }
        if let Some(child) = child {
            arena.node_mut(parent)?.children.push(child);
            arena.node_mut(child)?.parent = Some(parent);
        }
        arena.invalidate_layout(parent);
        Ok(previous)
    }

    /// Detaches `child` from its parent, keeping it alive.
    ///
    /// Returns the former parent. Detaching a root is a no-op.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn detach(&self, child: NodeId) -> Result<Option<NodeId>, TreeError> {
        let unlinked = self.shared.arena.borrow_mut().unlink(child)?;
        Ok(unlinked.map(|(parent, _)| parent))
    }

    /// Puts the detached node `new` where `old` is and removes `old`'s subtree.
    ///
    /// `new` keeps `old`'s index among its siblings. When `old` is a root,
    /// `old` is removed and `new` stays a root.
    ///
    /// # Errors
    ///
    /// [`TreeError::AlreadyParented`] if `new` is attached,
    /// [`TreeError::Cycle`] if `new` is an ancestor of `old`, and
    /// [`TreeError::StaleNode`].
    pub fn replace(&self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        let freed = {
            let mut arena = self.shared.arena.borrow_mut();
            arena.node(old)?;
            if arena.node(new)?.parent.is_some() {
                return Err(TreeError::AlreadyParented { child: new });
            }
            if arena.is_ancestor_or_self(new, old) {
                return Err(TreeError::Cycle {
                    parent: old,
                    child: new,
                });
            }
            if let Some((parent, index)) = arena.unlink(old)? {
                arena.node_mut(parent)?.children.insert(index, new);
                arena.node_mut(new)?.parent = Some(parent);
            }
            arena.free_subtree(old)?
        };
        trace!(?old, ?new, "node replaced");
        self.shared.removed.emit(&freed);
        Ok(())
    }

    /// Detaches `id` and frees it together with its whole subtree.
    ///
    /// Observers of the removed nodes receive nothing further. The freed ids
    /// are then announced to [`Tree::on_removed`] subscribers.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn remove(&self, id: NodeId) -> Result<(), TreeError> {
        let freed = {
            let mut arena = self.shared.arena.borrow_mut();
            arena.unlink(id)?;
            arena.free_subtree(id)?
        };
        self.shared.removed.emit(&freed);
        Ok(())
    }

    /// Calls `callback` with the ids freed by each [`Tree::remove`] or
    /// [`Tree::replace`], in pre-order, after the tree is consistent again.
    ///
    /// Owners of per-node state use this to drop it when the node goes away.
    pub fn on_removed(&self, callback: impl Fn(&[NodeId]) + 'static) -> Subscription {
        self.shared.removed.subscribe(callback)
    }

    // --- Properties ----------------------------------------------------------

    /// Resolves a property by name on a node.
    ///
    /// Plain names are searched on the node's kind, then on the shared base
    /// (`Layout`). A qualified `Owner.Name` selects an attached property,
    /// such as `Grid.Row`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownProperty`] and [`TreeError::StaleNode`].
    pub fn lookup_property(&self, id: NodeId, name: &str) -> Result<PropertyId, TreeError> {
        let kind = self.kind(id)?;
        let registry = self.catalog().registry();
        let found = match name.split_once('.') {
            Some((owner, name)) => registry.lookup(owner, name),
            None => registry.lookup_in(&kind.owners(), name),
        };
        found.ok_or_else(|| TreeError::UnknownProperty {
            kind,
            name: name.to_owned(),
        })
    }

    /// The registered name of a property, for diagnostics.
    #[must_use]
    pub fn property_name(&self, id: PropertyId) -> Option<&'static str> {
        self.catalog().registry().name(id)
    }

    /// Reads the effective value of a property.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`], or a wrapped
    /// [`PropertyError`](trellis_property::PropertyError).
    pub fn get<T: PropertyValue>(&self, id: NodeId, property: Property<T>) -> Result<T, TreeError> {
        let arena = self.shared.arena.borrow();
        Ok(arena
            .node(id)?
            .store
            .get(property, self.catalog().registry())?)
    }

    /// Reads the effective value of a property, type-erased.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::get`].
    pub fn get_erased(&self, id: NodeId, property: PropertyId) -> Result<ErasedValue, TreeError> {
        let arena = self.shared.arena.borrow();
        Ok(arena
            .node(id)?
            .store
            .get_erased(property, self.catalog().registry())?)
    }

    /// Writes a property. See [`Tree::set_erased`].
    ///
    /// # Errors
    ///
    /// Same as [`Tree::set_erased`].
    pub fn set<T: PropertyValue>(
        &self,
        id: NodeId,
        property: Property<T>,
        value: T,
    ) -> Result<bool, TreeError> {
        self.set_erased(id, property.id(), ErasedValue::new(value))
    }

    /// Writes a property and returns whether its value changed.
    ///
    /// When it did, invalidation happens first and then the change is
    /// published, synchronously, before this returns. A publish whose new
    /// value equals the value already being published for the same node and
    /// property is suppressed, which breaks re-entrant cycles. Both checks use
    /// `==`, so a value that is not equal to itself (a NaN) always counts as a
    /// change; the standard size properties coerce NaN away for that reason.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`], or a wrapped
    /// [`PropertyError`](trellis_property::PropertyError) for a value of the
    /// wrong type. Nothing is stored on error.
    pub fn set_erased(
        &self,
        id: NodeId,
        property: PropertyId,
        value: ErasedValue,
    ) -> Result<bool, TreeError> {
        let registry = self.catalog().registry();
        let (change, stream) = {
            let mut arena = self.shared.arena.borrow_mut();
            let node = arena.node_mut(id)?;
            let Some(change) = node.store.set_erased(property, value, registry)? else {
                return Ok(false);
            };
            let stream = node.store.existing_stream(property);
            self.invalidate_for(&mut arena, id, property);
            (change, stream)
        };
        self.publish(id, property, &change, stream);
        Ok(true)
    }

    /// Removes a local value, falling back to the default.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::get`].
    pub fn clear(&self, id: NodeId, property: PropertyId) -> Result<bool, TreeError> {
        let registry = self.catalog().registry();
        let (change, stream) = {
            let mut arena = self.shared.arena.borrow_mut();
            let node = arena.node_mut(id)?;
            let Some(change) = node.store.clear(property, registry)? else {
                return Ok(false);
            };
            let stream = node.store.existing_stream(property);
            self.invalidate_for(&mut arena, id, property);
            (change, stream)
        };
        self.publish(id, property, &change, stream);
        Ok(true)
    }

    fn invalidate_for(&self, arena: &mut Arena, id: NodeId, property: PropertyId) {
        if self
            .catalog()
            .registry()
            .affects(property)
            .contains(Affects::LAYOUT)
        {
            arena.invalidate_layout(id);
        }
    }

    fn publish(
        &self,
        id: NodeId,
        property: PropertyId,
        change: &Change,
        stream: Option<Subject<Change>>,
    ) {
        let Some(stream) = stream else {
            return;
        };
        let cyclic = self
            .shared
            .publishing
            .borrow()
            .iter()
            .any(|f| f.node == id && f.property == property && f.value == change.new);
        if cyclic {
            trace!(?id, %property, "re-entrant publish suppressed");
            return;
        }
        self.shared.publishing.borrow_mut().push(InFlight {
            node: id,
            property,
            value: change.new.clone(),
        });
        let _guard = PublishGuard(&self.shared.publishing);
        trace!(?id, %property, new = ?change.new, "publish");
        stream.emit(change);
    }

    /// Subscribes to a property's change stream.
    ///
    /// With [`ObserveMode::CurrentFirst`] the callback first receives the
    /// current value as a synthetic [`Change`] before this returns.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::get_erased`].
    pub fn observe(
        &self,
        id: NodeId,
        property: PropertyId,
        mode: ObserveMode,
        callback: impl Fn(&Change) + 'static,
    ) -> Result<Subscription, TreeError> {
        let callback = Rc::new(callback);
        let (subscription, current) = {
            let mut arena = self.shared.arena.borrow_mut();
            let current = match mode {
                ObserveMode::CurrentFirst => Some(
                    arena
                        .node(id)?
                        .store
                        .get_erased(property, self.catalog().registry())?,
                ),
                ObserveMode::ChangesOnly => {
                    self.catalog().registry().registration(property)?;
                    None
                }
            };
            let stream = arena.node_mut(id)?.store.stream(property);
            let live = Rc::clone(&callback);
            (stream.subscribe(move |change| live(change)), current)
        };
        if let Some(current) = current {
            callback(&Change::current(current));
        }
        Ok(subscription)
    }

    /// Typed convenience over [`Tree::observe`] that delivers only new values.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::observe`].
    pub fn observe_value<T: PropertyValue>(
        &self,
        id: NodeId,
        property: Property<T>,
        mode: ObserveMode,
        callback: impl Fn(&T) + 'static,
    ) -> Result<Subscription, TreeError> {
        self.observe(id, property.id(), mode, move |change| {
            if let Some(value) = change.new_as::<T>() {
                callback(value);
            }
        })
    }

    // --- Data context --------------------------------------------------------

    /// The node's data context.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn data_context(&self, id: NodeId) -> Result<Option<DataContext>, TreeError> {
        self.get(id, self.props().data_context)
    }

    /// Sets the node's data context. Children are not touched.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn set_data_context(
        &self,
        id: NodeId,
        context: Option<DataContext>,
    ) -> Result<bool, TreeError> {
        self.set(id, self.props().data_context, context)
    }

    /// Writes `context` to `id` and then to each descendant, in pre-order.
    ///
    /// Each write publishes on its own node before the next one happens.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn cascade_data_context(
        &self,
        id: NodeId,
        context: Option<DataContext>,
    ) -> Result<(), TreeError> {
        for node in self.descendants(id)? {
            // Bindings fired by earlier writes may have removed nodes.
            if self.is_alive(node) {
                self.set_data_context(node, context.clone())?;
            }
        }
        Ok(())
    }

    // --- Diagnostics ---------------------------------------------------------

    /// Counters of measure and arrange policy runs.
    #[must_use]
    pub fn stats(&self) -> LayoutStats {
        self.shared.arena.borrow().stats
    }

    /// Resets [`Tree::stats`] to zero.
    pub fn reset_stats(&self) {
        self.shared.arena.borrow_mut().stats = LayoutStats::default();
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Tree");
        match self.shared.arena.try_borrow() {
            Ok(arena) => s.field("nodes", &arena.live_count()),
            Err(_) => s.field("nodes", &"<borrowed>"),
        };
        s.field("config", &self.shared.config).finish_non_exhaustive()
    }
}

impl WeakTree {
    /// Upgrades to a [`Tree`] if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Tree> {
        self.shared.upgrade().map(|shared| Tree { shared })
    }
}

impl fmt::Debug for WeakTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTree")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

struct PublishGuard<'a>(&'a RefCell<Vec<InFlight>>);

impl Drop for PublishGuard<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().pop();
    }
}
