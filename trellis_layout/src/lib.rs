// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Layout: an arena layout tree with observable node properties.
//!
//! A [`Tree`] owns nodes of a closed set of kinds ([`NodeKind`]): `Border`,
//! `Grid`, `StackPanel`, `TextBlock`, `Rectangle` and `Placeholder`. Each node
//! carries a sparse [`PropertyStore`](trellis_property::PropertyStore) keyed
//! by the shared [`Catalog`], and goes through a two-pass layout:
//!
//! 1. [`Tree::measure`] computes desired sizes bottom-up, memoized on the
//!    available size.
//! 2. [`Tree::arrange`] assigns absolute rects top-down.
//! 3. [`Tree::render`] walks the arranged subtree and issues calls on a
//!    [`DrawingContext`].
//!
//! Writes that affect layout send the node and its ancestors back to
//! [`LayoutState::Unmeasured`]. Every write that changes a value is published
//! synchronously on that property's change stream; see [`Tree::observe`].
//!
//! ## Data context
//!
//! [`DataContext`] is an ordinary property. Nothing inherits it implicitly:
//! [`Tree::cascade_data_context`] writes it to a whole subtree.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::{Insets, Size};
//! use trellis_layout::{Catalog, NodeKind, RecordingContext, Tree};
//!
//! let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
//! let props = *tree.props();
//!
//! let card = tree.create(NodeKind::Border);
//! let title = tree.create(NodeKind::TextBlock);
//! tree.set_child(card, Some(title)).unwrap();
//! tree.set(card, props.padding, Insets::uniform(1.0)).unwrap();
//! tree.set(title, props.text, "Trellis".to_string()).unwrap();
//!
//! tree.update_layout(card, Size::new(40.0, 10.0)).unwrap();
//! assert_eq!(tree.desired_size(card).unwrap(), Size::new(9.0, 3.0));
//!
//! let mut ctx = RecordingContext::new();
//! tree.render(card, &mut ctx).unwrap();
//! assert_eq!(ctx.texts(), vec!["Trellis"]);
//! ```

pub use kurbo;
pub use peniko;

mod catalog;
mod config;
mod context;
mod draw;
mod error;
mod grid;
mod layout;
mod render;
mod text;
mod tree;
mod types;

pub use catalog::{Catalog, CatalogBuilder, LayoutProperties};
pub use config::LayoutConfig;
pub use context::DataContext;
pub use draw::{DrawCommand, DrawError, DrawingContext, Pen, RecordingContext, is_paintable};
pub use error::TreeError;
pub use grid::{GridLength, GridLengthError, TrackOverflow};
pub use text::{MonospaceMeasure, TextMeasure};
pub use tree::{Tree, TreeBuilder, WeakTree};
pub use types::{BASE_OWNER, LayoutState, LayoutStats, NodeId, NodeKind, Orientation, Slots};
