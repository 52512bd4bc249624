// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_binding::BindingDeclaration;
use trellis_layout::{NodeId, Tree, TreeError};
use trellis_template::ControlTemplate;

/// What a loader built from one source.
#[derive(Debug)]
pub enum Loaded {
    /// A detached layout subtree and the bindings it declares.
    Layout {
        /// Root of the new subtree.
        root: NodeId,
        /// Pending binding declarations, in document order.
        declarations: Vec<BindingDeclaration>,
    },
    /// A set of control templates.
    Templates(Vec<ControlTemplate>),
}

impl Loaded {
    fn describe(&self) -> &'static str {
        match self {
            Self::Layout { .. } => "a layout",
            Self::Templates(_) => "templates",
        }
    }
}

/// The markup loader boundary.
///
/// A loader parses `source` and creates its nodes in `tree`, detached. It
/// does not bind or inflate anything; the host does that with the result.
/// Closures of the matching shape are loaders.
pub trait Loader {
    /// Builds the object graph described by `source`.
    ///
    /// # Errors
    ///
    /// [`LoadError`] for anything the loader cannot build.
    fn load(&self, source: &str, tree: &Tree) -> Result<Loaded, LoadError>;
}

impl<F> Loader for F
where
    F: Fn(&str, &Tree) -> Result<Loaded, LoadError>,
{
    fn load(&self, source: &str, tree: &Tree) -> Result<Loaded, LoadError> {
        self(source, tree)
    }
}

/// Failure reported by, or about the output of, a [`Loader`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The loader rejected the source.
    #[error("{0}")]
    Source(String),
    /// The source described the wrong kind of content for the call.
    #[error("expected {expected}, the source produced {found}")]
    UnexpectedContent {
        /// What the host asked for.
        expected: &'static str,
        /// What the loader returned.
        found: &'static str,
    },
    /// A tree edit failed while building.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl LoadError {
    pub(crate) fn unexpected(expected: &'static str, found: &Loaded) -> Self {
        Self::UnexpectedContent {
            expected,
            found: found.describe(),
        }
    }
}
