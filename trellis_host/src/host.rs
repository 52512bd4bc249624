// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Size};
use tracing::{debug, info, warn};
use trellis_binding::{Accessors, Binder, BindingDeclaration};
use trellis_layout::{DataContext, DrawingContext, NodeId, Tree, TreeError};
use trellis_template::{Inflator, TemplateCatalog};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::loader::{LoadError, Loaded, Loader};

/// Owns a tree, its bindings and templates, and drives it frame by frame.
///
/// [`Host::load`] turns a source into the live root: the loader builds the
/// subtree, the declared bindings are attached, placeholders are inflated and
/// the bindings the templates declare are attached in turn. If any step
/// fails, everything built for the new source is removed, the previous root
/// stays, and [`Host::frame`] draws a diagnostic instead of content until the
/// next successful load.
pub struct Host<L> {
    tree: Tree,
    loader: L,
    binder: Binder,
    templates: TemplateCatalog,
    root: Option<NodeId>,
    data_context: Option<DataContext>,
    diagnostic: Option<String>,
    config: HostConfig,
}

impl<L: Loader> Host<L> {
    /// A host with no root, reading models through `accessors`.
    pub fn new(tree: Tree, accessors: Rc<Accessors>, loader: L) -> Self {
        Self {
            binder: Binder::new(tree.clone(), accessors),
            tree,
            loader,
            templates: TemplateCatalog::new(),
            root: None,
            data_context: None,
            diagnostic: None,
            config: HostConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// The tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The binder holding every live binding.
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// The templates loaded so far.
    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    /// The current root, if a layout was loaded.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The data context given to every loaded root.
    pub fn data_context(&self) -> Option<&DataContext> {
        self.data_context.as_ref()
    }

    /// The message of the last failed load, until the next successful one.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// The configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Loads a layout and makes it the root.
    ///
    /// On success the previous root's bindings are disposed and its subtree is
    /// removed, and the host's data context is cascaded into the new root.
    ///
    /// # Errors
    ///
    /// Any [`HostError`]. The previous root is kept and the error is also
    /// stored as the diagnostic.
    pub fn load(&mut self, source: &str) -> Result<NodeId, HostError> {
        let result = self.load_layout(source);
        self.record(result)
    }

    /// Loads control templates and adds them to the catalog.
    ///
    /// Templates replace earlier ones with the same name. Returns how many
    /// were loaded.
    ///
    /// # Errors
    ///
    /// Any [`HostError`], also stored as the diagnostic.
    pub fn load_templates(&mut self, source: &str) -> Result<usize, HostError> {
        let result = match self.loader.load(source, &self.tree) {
            Ok(Loaded::Templates(templates)) => {
                let count = templates.len();
                self.templates.extend(templates);
                debug!(count, "templates loaded");
                Ok(count)
            }
            Ok(other) => {
                if let Loaded::Layout { root, .. } = other {
                    self.discard(root);
                }
                Err(LoadError::unexpected("templates", &other).into())
            }
            Err(error) => Err(error.into()),
        };
        self.record(result)
    }

    /// Sets the data context and cascades it through the current root.
    ///
    /// # Errors
    ///
    /// [`TreeError`] if a write fails.
    pub fn set_data_context(&mut self, context: Option<DataContext>) -> Result<(), TreeError> {
        self.data_context = context;
        match self.root {
            Some(root) => self.tree.cascade_data_context(root, self.data_context.clone()),
            None => Ok(()),
        }
    }

    /// Lays out the root in `size` and draws it.
    ///
    /// While a diagnostic is stored, only the diagnostic text is drawn,
    /// centered.
    ///
    /// # Errors
    ///
    /// Layout and render errors from the tree.
    pub fn frame(&self, size: Size, ctx: &mut dyn DrawingContext) -> Result<(), TreeError> {
        if let Some(message) = &self.diagnostic {
            let extent = self.tree.text_measure().measure(message);
            let origin = Point::new(
                (size.width - extent.width) / 2.0,
                (size.height - extent.height) / 2.0,
            );
            if let Err(error) = ctx.draw_text(origin, self.config.diagnostic_color, message) {
                debug!(%error, "diagnostic not drawn");
            }
            return Ok(());
        }
        let Some(root) = self.root else {
            return Ok(());
        };
        self.tree.update_layout(root, size)?;
        self.tree.render(root, ctx)
    }

    fn record<T>(&mut self, result: Result<T, HostError>) -> Result<T, HostError> {
        match &result {
            Ok(_) => self.diagnostic = None,
            Err(error) => {
                warn!(%error, "load failed, keeping the previous tree");
                self.diagnostic = Some(error.to_string());
            }
        }
        result
    }

    fn load_layout(&mut self, source: &str) -> Result<NodeId, HostError> {
        let (root, declarations) = match self.loader.load(source, &self.tree)? {
            Loaded::Layout { root, declarations } => (root, declarations),
            other => return Err(LoadError::unexpected("a layout", &other).into()),
        };
        let mut staged = root;
        if let Err(error) = self.stage(&mut staged, &declarations) {
            self.discard(staged);
            return Err(error);
        }

        if let Some(previous) = self.root.replace(staged) {
            let released = self.binder.unbind_subtree(previous)?;
            self.tree.remove(previous)?;
            debug!(?previous, released, "previous root removed");
        }
        info!(root = ?staged, bindings = self.binder.len(), "layout loaded");
        Ok(staged)
    }

    /// Binds, inflates and binds again. `root` tracks the subtree root, which
    /// inflation replaces when the loaded root is itself a placeholder.
    fn stage(
        &mut self,
        root: &mut NodeId,
        declarations: &[BindingDeclaration],
    ) -> Result<(), HostError> {
        self.binder.bind_all(declarations)?;
        let inflation = Inflator::with_max_depth(self.config.max_template_depth).inflate(
            &self.tree,
            *root,
            &self.templates,
        )?;
        *root = inflation.root;
        self.binder.bind_all(&inflation.declarations)?;
        if self.data_context.is_some() {
            self.tree
                .cascade_data_context(*root, self.data_context.clone())?;
        }
        Ok(())
    }

    /// Removes a subtree built for a failed load, with its bindings.
    fn discard(&mut self, root: NodeId) {
        if self.tree.is_alive(root)
            && let Err(error) = self.tree.remove(root)
        {
            debug!(%error, "could not remove a partially loaded subtree");
        }
        let pruned = self.binder.prune();
        debug!(?root, pruned, "partial load discarded");
    }
}

impl<L> fmt::Debug for Host<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("root", &self.root)
            .field("bindings", &self.binder.len())
            .field("templates", &self.templates.len())
            .field("diagnostic", &self.diagnostic)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use peniko::color::palette::css;
    use trellis_binding::BindingDirection;
    use trellis_layout::{Catalog, DrawCommand, NodeKind, RecordingContext};
    use trellis_template::{ControlTemplate, Inflated, TemplateError};

    struct Person {
        name: RefCell<String>,
    }

    fn person(name: &str) -> DataContext {
        DataContext::new(Rc::new(Person {
            name: RefCell::new(name.to_owned()),
        }))
    }

    fn badge(tree: &Tree, parent: Option<NodeId>) -> Result<Inflated, TemplateError> {
        let border = tree.create(NodeKind::Border);
        let mut inflated = Inflated::new(border);
        if let Some(parent) = parent {
            inflated = inflated.with_declaration(BindingDeclaration::ancestor(
                border,
                "Background",
                parent,
                "Background",
            ));
        }
        Ok(inflated)
    }

    /// Stands in for a markup loader: each source names a canned document.
    fn markup(source: &str, tree: &Tree) -> Result<Loaded, LoadError> {
        let props = *tree.props();
        match source {
            "greeting" => {
                let border = tree.create(NodeKind::Border);
                let label = tree.create(NodeKind::TextBlock);
                tree.set_child(border, Some(label))?;
                Ok(Loaded::Layout {
                    root: border,
                    declarations: vec![BindingDeclaration::data_context(
                        label,
                        "Text",
                        "Name",
                        BindingDirection::ONE_WAY,
                    )],
                })
            }
            "badge" | "orphan" => {
                let stack = tree.create(NodeKind::StackPanel);
                tree.set(stack, props.background, css::BLUE)?;
                let slot = tree.create(NodeKind::Placeholder);
                let name = if source == "badge" { "Badge" } else { "Nope" };
                tree.set(slot, props.template_name, name.to_owned())?;
                tree.append_child(stack, slot)?;
                Ok(Loaded::Layout {
                    root: stack,
                    declarations: Vec::new(),
                })
            }
            "misbound" => {
                let label = tree.create(NodeKind::TextBlock);
                Ok(Loaded::Layout {
                    root: label,
                    declarations: vec![BindingDeclaration::data_context(
                        label,
                        "Nope",
                        "Name",
                        BindingDirection::ONE_WAY,
                    )],
                })
            }
            "templates" => Ok(Loaded::Templates(vec![ControlTemplate::new(
                "Badge", badge,
            )])),
            other => Err(LoadError::Source(format!("unexpected token `{other}`"))),
        }
    }

    type TestLoader = fn(&str, &Tree) -> Result<Loaded, LoadError>;

    fn host() -> Host<TestLoader> {
        let mut accessors = Accessors::new();
        accessors.register::<Person>().property(
            "Name",
            |p| p.name.borrow().clone(),
            |p, v| *p.name.borrow_mut() = v,
        );
        let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
        Host::new(tree, Rc::new(accessors), markup as TestLoader)
    }

    const SIZE: Size = Size::new(40.0, 10.0);

    fn texts(host: &Host<TestLoader>) -> Vec<String> {
        let mut ctx = RecordingContext::new();
        host.frame(SIZE, &mut ctx).unwrap();
        ctx.texts().into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn a_loaded_layout_follows_the_data_context() {
        let mut host = host();
        host.set_data_context(Some(person("Ada"))).unwrap();
        let root = host.load("greeting").unwrap();

        assert_eq!(host.root(), Some(root));
        assert_eq!(host.diagnostic(), None);
        assert_eq!(texts(&host), vec!["Ada"]);

        host.set_data_context(Some(person("Grace"))).unwrap();
        assert_eq!(texts(&host), vec!["Grace"]);
    }

    #[test]
    fn a_failed_load_keeps_the_previous_root_and_draws_a_diagnostic() {
        let mut host = host();
        host.set_data_context(Some(person("Ada"))).unwrap();
        let root = host.load("greeting").unwrap();
        let nodes = host.tree().len();

        let err = host.load("bogus").unwrap_err();
        assert!(matches!(err, HostError::Load(LoadError::Source(_))));
        assert_eq!(host.root(), Some(root));
        assert_eq!(host.tree().len(), nodes);

        let message = host.diagnostic().unwrap().to_owned();
        assert_eq!(message, err.to_string());
        let extent = host.tree().text_measure().measure(&message);
        let mut ctx = RecordingContext::new();
        host.frame(SIZE, &mut ctx).unwrap();
        assert_eq!(
            ctx.commands(),
            &[DrawCommand::Text {
                origin: Point::new(
                    (SIZE.width - extent.width) / 2.0,
                    (SIZE.height - extent.height) / 2.0
                ),
                brush: css::RED,
                text: message,
            }]
        );

        host.load("greeting").unwrap();
        assert_eq!(host.diagnostic(), None);
        assert_eq!(texts(&host), vec!["Ada"]);
    }

    #[test]
    fn failed_bindings_and_templates_are_rolled_back() {
        let mut host = host();
        host.load("greeting").unwrap();
        let nodes = host.tree().len();
        let bindings = host.binder().len();

        let err = host.load("orphan").unwrap_err();
        assert!(matches!(
            err,
            HostError::Template(TemplateError::Missing { ref name, .. }) if name == "Nope"
        ));
        assert_eq!(host.tree().len(), nodes);

        let err = host.load("misbound").unwrap_err();
        assert!(matches!(
            err,
            HostError::Bind(trellis_binding::BindError::Tree(TreeError::UnknownProperty { .. }))
        ));
        assert_eq!(host.tree().len(), nodes);
        assert_eq!(host.binder().len(), bindings);
    }

    #[test]
    fn templates_inflate_and_follow_their_templated_parent() {
        let mut host = host();
        assert_eq!(host.load_templates("templates").unwrap(), 1);
        let root = host.load("badge").unwrap();

        let tree = host.tree().clone();
        let props = *tree.props();
        let children = tree.children(root).unwrap();
        assert_eq!(children.len(), 1);
        let border = children[0];
        assert_eq!(tree.kind(border).unwrap(), NodeKind::Border);
        assert_eq!(tree.get(border, props.background).unwrap(), css::BLUE);

        tree.set(root, props.background, css::GREEN).unwrap();
        assert_eq!(tree.get(border, props.background).unwrap(), css::GREEN);
    }

    #[test]
    fn reloading_replaces_the_root_and_its_bindings() {
        let mut host = host();
        let first = host.load("greeting").unwrap();
        let second = host.load("greeting").unwrap();

        assert!(!host.tree().is_alive(first));
        assert_eq!(host.root(), Some(second));
        assert_eq!(host.binder().len(), 1);
    }

    #[test]
    fn template_sources_must_produce_templates() {
        let mut host = host();
        let err = host.load_templates("greeting").unwrap_err();
        assert_eq!(
            err,
            HostError::Load(LoadError::UnexpectedContent {
                expected: "templates",
                found: "a layout",
            })
        );
        assert!(host.tree().is_empty());
        assert!(host.templates().is_empty());
        assert!(host.diagnostic().is_some());
    }

    #[test]
    fn config_controls_diagnostic_color() {
        let mut host = host().with_config(HostConfig::default().with_diagnostic_color(css::BLUE));
        host.load("bogus").unwrap_err();
        let mut ctx = RecordingContext::new();
        host.frame(SIZE, &mut ctx).unwrap();
        assert!(matches!(
            ctx.commands(),
            [DrawCommand::Text { brush, .. }] if *brush == css::BLUE
        ));
    }
}
