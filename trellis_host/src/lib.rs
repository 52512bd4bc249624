// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Host: the surface an application drives.
//!
//! A [`Host`] owns a layout [`Tree`](trellis_layout::Tree), a
//! [`Binder`](trellis_binding::Binder) and a
//! [`TemplateCatalog`](trellis_template::TemplateCatalog). Markup parsing
//! lives behind the [`Loader`] trait; the host binds, inflates and installs
//! what a loader builds, then measures, arranges and renders the root every
//! [`frame`](Host::frame).
//!
//! A failed load never leaves a half-built tree behind. The previous root
//! stays live, the error is logged with `tracing`, and the frame shows the
//! error message, centered, until a load succeeds.
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::Size;
//! use trellis_binding::Accessors;
//! use trellis_host::{Host, LoadError, Loaded};
//! use trellis_layout::{Catalog, NodeKind, RecordingContext, Tree};
//!
//! fn loader(source: &str, tree: &Tree) -> Result<Loaded, LoadError> {
//!     let label = tree.create(NodeKind::TextBlock);
//!     tree.set(label, tree.props().text, source.to_owned())?;
//!     Ok(Loaded::Layout { root: label, declarations: Vec::new() })
//! }
//!
//! let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
//! let mut host = Host::new(tree, Rc::new(Accessors::new()), loader);
//! host.load("hello").unwrap();
//!
//! let mut ctx = RecordingContext::new();
//! host.frame(Size::new(20.0, 2.0), &mut ctx).unwrap();
//! assert_eq!(ctx.texts(), vec!["hello"]);
//! ```

mod config;
mod error;
mod host;
mod loader;

pub use config::HostConfig;
pub use error::HostError;
pub use host::Host;
pub use loader::{LoadError, Loaded, Loader};
