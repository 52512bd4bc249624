// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use trellis_binding::BindingDeclaration;
use trellis_layout::{NodeId, Tree};

use crate::error::TemplateError;

/// The output of one template build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inflated {
    /// Root of the fresh, detached subtree.
    pub root: NodeId,
    /// Bindings the subtree needs, typically to its templated parent.
    pub declarations: Vec<BindingDeclaration>,
}

impl Inflated {
    /// A subtree with no bindings.
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            declarations: Vec::new(),
        }
    }

    /// Adds a binding declaration.
    #[must_use]
    pub fn with_declaration(mut self, declaration: BindingDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }
}

/// Builds a fresh instance of a template.
///
/// Closures of the matching shape are factories.
pub trait TemplateFactory {
    /// Creates the subtree in `tree`, detached.
    ///
    /// `templated_parent` is the node the placeholder sat under, if any.
    ///
    /// # Errors
    ///
    /// Any [`TemplateError`], usually a wrapped tree error.
    fn build(&self, tree: &Tree, templated_parent: Option<NodeId>)
    -> Result<Inflated, TemplateError>;
}

impl<F> TemplateFactory for F
where
    F: Fn(&Tree, Option<NodeId>) -> Result<Inflated, TemplateError>,
{
    fn build(
        &self,
        tree: &Tree,
        templated_parent: Option<NodeId>,
    ) -> Result<Inflated, TemplateError> {
        self(tree, templated_parent)
    }
}

/// A named template.
#[derive(Clone)]
pub struct ControlTemplate {
    name: String,
    factory: Rc<dyn TemplateFactory>,
}

impl ControlTemplate {
    /// Names a factory.
    pub fn new(name: impl Into<String>, factory: impl TemplateFactory + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Rc::new(factory),
        }
    }

    /// The template's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The factory.
    #[must_use]
    pub fn factory(&self) -> &Rc<dyn TemplateFactory> {
        &self.factory
    }
}

impl fmt::Debug for ControlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Looks templates up by name.
pub trait ResolveTemplate {
    /// The factory registered as `name`, if any.
    fn resolve(&self, name: &str) -> Option<Rc<dyn TemplateFactory>>;
}

/// A name-keyed set of templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, ControlTemplate>,
}

impl TemplateCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, returning the one it replaced.
    pub fn insert(&mut self, template: ControlTemplate) -> Option<ControlTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    /// The template named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ControlTemplate> {
        self.templates.get(name)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Extend<ControlTemplate> for TemplateCatalog {
    fn extend<I: IntoIterator<Item = ControlTemplate>>(&mut self, iter: I) {
        for template in iter {
            self.insert(template);
        }
    }
}

impl FromIterator<ControlTemplate> for TemplateCatalog {
    fn from_iter<I: IntoIterator<Item = ControlTemplate>>(iter: I) -> Self {
        let mut catalog = Self::new();
        catalog.extend(iter);
        catalog
    }
}

impl ResolveTemplate for TemplateCatalog {
    fn resolve(&self, name: &str) -> Option<Rc<dyn TemplateFactory>> {
        self.templates.get(name).map(|t| Rc::clone(&t.factory))
    }
}
