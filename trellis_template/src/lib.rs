// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Template: named control templates and placeholder inflation.
//!
//! A [`ControlTemplate`] pairs a name with a [`TemplateFactory`] that builds a
//! fresh subtree on demand. A tree marks where templates go with
//! `Placeholder` nodes whose `TemplateName` property names one. The
//! [`Inflator`] swaps each placeholder for a new instance, at the same
//! position, and collects the binding declarations the instances need.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_layout::{Catalog, NodeId, NodeKind, Tree};
//! use trellis_template::{
//!     ControlTemplate, Inflated, Inflator, TemplateCatalog, TemplateError,
//! };
//!
//! fn badge(tree: &Tree, _parent: Option<NodeId>) -> Result<Inflated, TemplateError> {
//!     let label = tree.create(NodeKind::TextBlock);
//!     tree.set(label, tree.props().text, "new".to_string())?;
//!     Ok(Inflated::new(label))
//! }
//!
//! let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
//! let stack = tree.create(NodeKind::StackPanel);
//! let slot = tree.create(NodeKind::Placeholder);
//! tree.set(slot, tree.props().template_name, "Badge".to_string()).unwrap();
//! tree.append_child(stack, slot).unwrap();
//!
//! let templates: TemplateCatalog = [ControlTemplate::new("Badge", badge)].into_iter().collect();
//! let inflation = Inflator::default().inflate(&tree, stack, &templates).unwrap();
//! assert_eq!(inflation.inflated, 1);
//! assert_eq!(tree.kind(tree.children(stack).unwrap()[0]).unwrap(), NodeKind::TextBlock);
//! ```

mod error;
mod inflate;
mod template;

pub use error::TemplateError;
pub use inflate::{Inflation, Inflator};
pub use template::{ControlTemplate, Inflated, ResolveTemplate, TemplateCatalog, TemplateFactory};
