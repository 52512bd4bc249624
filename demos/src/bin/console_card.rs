// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bound card rendered to the terminal.
//!
//! Loads control templates and a layout through a canned loader, binds the
//! card's accent color and title to a model, and prints two frames: before
//! and after the model changes. A third load fails on purpose to show the
//! diagnostic path.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p trellis_demos --bin console_card`

use std::cell::RefCell;
use std::error::Error;
use std::io::{self, Write};
use std::rc::Rc;

use kurbo::Insets;
use peniko::Color;
use peniko::color::palette::css;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trellis_binding::{Accessors, BindingDeclaration, BindingDirection, Notifier, Notify};
use trellis_console::ConsoleCanvas;
use trellis_host::{Host, LoadError, Loaded};
use trellis_layout::{DataContext, GridLength, NodeId, NodeKind, Tree};
use trellis_template::{ControlTemplate, Inflated, TemplateError};

struct Theme {
    accent: RefCell<Color>,
    title: RefCell<String>,
    notifier: Notifier,
}

impl Notify for Theme {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}

impl Theme {
    fn set_accent(&self, accent: Color) {
        *self.accent.borrow_mut() = accent;
        self.notifier.notify("Accent");
    }
}

/// A swatch filled with its frame's border brush.
fn swatch(tree: &Tree, parent: Option<NodeId>) -> Result<Inflated, TemplateError> {
    let border = tree.create(NodeKind::Border);
    tree.set(border, tree.props().height, Some(2.0))?;
    let mut inflated = Inflated::new(border);
    if let Some(parent) = parent {
        inflated = inflated.with_declaration(BindingDeclaration::ancestor(
            border,
            "Background",
            parent,
            "BorderBrush",
        ));
    }
    Ok(inflated)
}

fn tracks(text: &str) -> Result<Vec<GridLength>, LoadError> {
    GridLength::parse_list(text).map_err(|e| LoadError::Source(e.to_string()))
}

/// Plays the part of a markup loader.
fn load(source: &str, tree: &Tree) -> Result<Loaded, LoadError> {
    let props = *tree.props();
    match source {
        "templates" => Ok(Loaded::Templates(vec![ControlTemplate::new(
            "Swatch", swatch,
        )])),
        "card" => {
            let card = tree.create(NodeKind::Border);
            tree.set(card, props.padding, Insets::uniform(1.0))?;
            tree.set(card, props.background, css::SLATE_GRAY)?;

            let grid = tree.create(NodeKind::Grid);
            tree.set(grid, props.column_definitions, tracks("*, 2*")?)?;
            tree.set(grid, props.row_definitions, tracks("Auto, *")?)?;
            tree.set_child(card, Some(grid))?;

            let header = tree.create(NodeKind::Border);
            tree.set(header, props.column, 1)?;
            let title = tree.create(NodeKind::TextBlock);
            tree.set_child(header, Some(title))?;
            tree.append_child(grid, header)?;

            let frame = tree.create(NodeKind::Border);
            tree.set(frame, props.row, 1)?;
            tree.set(frame, props.column, 1)?;
            tree.set(frame, props.padding, Insets::uniform(1.0))?;
            tree.set(frame, props.border_brush, css::NAVY)?;
            let slot = tree.create(NodeKind::Placeholder);
            tree.set(slot, props.template_name, "Swatch".to_owned())?;
            tree.set_child(frame, Some(slot))?;
            tree.append_child(grid, frame)?;

            Ok(Loaded::Layout {
                root: card,
                declarations: vec![
                    BindingDeclaration::data_context(
                        header,
                        "Background",
                        "Accent",
                        BindingDirection::ONE_WAY,
                    ),
                    BindingDeclaration::data_context(
                        title,
                        "Text",
                        "Title",
                        BindingDirection::ONE_WAY,
                    ),
                ],
            })
        }
        other => Err(LoadError::Source(format!("no document named `{other}`"))),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut accessors = Accessors::new();
    accessors
        .register_notifying::<Theme>()
        .property(
            "Accent",
            |t| *t.accent.borrow(),
            |t, v| t.set_accent(v),
        )
        .read_only("Title", |t| t.title.borrow().clone());

    let theme = Rc::new(Theme {
        accent: RefCell::new(css::DARK_CYAN),
        title: RefCell::new("Trellis".to_owned()),
        notifier: Notifier::new(),
    });

    let tree = Tree::new(Rc::new(trellis_layout::Catalog::new()?));
    let mut host = Host::new(tree, Rc::new(accessors), load);
    host.load_templates("templates")?;
    host.load("card")?;
    host.set_data_context(Some(DataContext::new(Rc::clone(&theme))))?;
    info!(bindings = host.binder().len(), "card ready");

    let mut out = io::stdout().lock();
    let mut canvas = ConsoleCanvas::new(36, 10);
    host.frame(canvas.size(), &mut canvas)?;
    canvas.write_ansi(&mut out)?;
    writeln!(out)?;

    theme.set_accent(css::CRIMSON);
    canvas.clear();
    host.frame(canvas.size(), &mut canvas)?;
    canvas.write_ansi(&mut out)?;

    if host.load("missing").is_err() {
        writeln!(out, "\n{}", host.diagnostic().unwrap_or_default())?;
    }
    Ok(())
}
