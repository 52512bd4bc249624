// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use tracing::debug;
use trellis_binding::BindingDeclaration;
use trellis_layout::{NodeId, NodeKind, Tree};

use crate::error::TemplateError;
use crate::template::{ResolveTemplate, TemplateFactory};

/// Replaces `Placeholder` nodes with template instances.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Inflator {
    /// How many levels of templates-within-templates are expanded before
    /// giving up with [`TemplateError::Recursion`].
    pub max_depth: usize,
}

impl Default for Inflator {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

/// What [`Inflator::inflate`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inflation {
    /// The subtree root. Differs from the input when the root itself was a
    /// placeholder.
    pub root: NodeId,
    /// Declarations returned by every template built, in splice order.
    pub declarations: Vec<BindingDeclaration>,
    /// Number of placeholders replaced.
    pub inflated: usize,
}

impl Inflator {
    /// An inflator with the given depth limit.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Expands every placeholder under `root`, in pre-order.
    ///
    /// All placeholder names at one level are resolved before any of them is
    /// spliced, so a missing name leaves that level as it was. Each placeholder
    /// is replaced at the same sibling index, and the template's root gets the
    /// placeholder's parent as templated parent. Placeholders produced by a
    /// template are expanded in turn, depth first.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Missing`], [`TemplateError::Recursion`], and any error
    /// a factory or tree edit returns. Only the failing level is left
    /// untouched: instances spliced before the failure stay in the tree, their
    /// declarations are dropped with the [`Inflation`], and later placeholders
    /// are not expanded. If the root itself was replaced, the new root's
    /// subtree is removed instead.
    pub fn inflate(
        &self,
        tree: &Tree,
        root: NodeId,
        templates: &dyn ResolveTemplate,
    ) -> Result<Inflation, TemplateError> {
        let mut inflation = Inflation {
            root,
            declarations: Vec::new(),
            inflated: 0,
        };
        if let Err(error) = self.expand(tree, root, templates, 0, &mut inflation) {
            if inflation.root != root
                && let Err(cleanup) = tree.remove(inflation.root)
            {
                debug!(%cleanup, "could not remove partially inflated root");
            }
            return Err(error);
        }
        Ok(inflation)
    }

    fn expand(
        &self,
        tree: &Tree,
        subtree: NodeId,
        templates: &dyn ResolveTemplate,
        depth: usize,
        out: &mut Inflation,
    ) -> Result<(), TemplateError> {
        let template_name = tree.props().template_name;
        let mut pending: Vec<(NodeId, String, Rc<dyn TemplateFactory>)> = Vec::new();
        for node in tree.descendants(subtree)? {
            if tree.kind(node)? != NodeKind::Placeholder {
                continue;
            }
            let name = tree.get(node, template_name)?;
            if depth >= self.max_depth {
                return Err(TemplateError::Recursion {
                    name,
                    max_depth: self.max_depth,
                });
            }
            match templates.resolve(&name) {
                Some(factory) => pending.push((node, name, factory)),
                None => {
                    return Err(TemplateError::Missing {
                        name,
                        placeholder: node,
                    });
                }
            }
        }

        for (placeholder, name, factory) in pending {
            let templated_parent = tree.parent(placeholder)?;
            let built = factory.build(tree, templated_parent)?;
            tree.replace(placeholder, built.root)?;
            debug!(?placeholder, root = ?built.root, %name, depth, "template inflated");
            if out.root == placeholder {
                out.root = built.root;
            }
            out.declarations.extend(built.declarations);
            out.inflated += 1;
            self.expand(tree, built.root, templates, depth + 1, out)?;
        }
        Ok(())
    }
}
