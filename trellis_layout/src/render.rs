// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use tracing::debug;
use trellis_property::{Property, PropertyRegistry, PropertyValue};

use crate::catalog::LayoutProperties;
use crate::draw::{DrawError, DrawingContext, Pen, is_paintable, is_transparent, is_visible_rect};
use crate::error::TreeError;
use crate::tree::{Arena, Node, Tree};
use crate::types::{LayoutState, NodeId, NodeKind};

impl Tree {
    /// Draws `id` and then its children, in child order.
    ///
    /// Invisible work (zero-area bounds, transparent colors, empty text) issues
    /// no calls. A primitive that fails is logged at `debug` and skipped.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotArranged`] if any node in the subtree has not been
    /// arranged since its last layout change, and [`TreeError::StaleNode`].
    pub fn render(&self, id: NodeId, ctx: &mut dyn DrawingContext) -> Result<(), TreeError> {
        let arena = self.arena().borrow();
        let painter = Painter {
            arena: &arena,
            registry: self.catalog().registry(),
            props: *self.props(),
        };
        painter.paint(id, ctx)
    }
}

struct Painter<'a> {
    arena: &'a Arena,
    registry: &'a PropertyRegistry,
    props: LayoutProperties,
}

impl Painter<'_> {
    fn prop<T: PropertyValue>(&self, node: &Node, property: Property<T>) -> Result<T, TreeError> {
        Ok(node.store.get(property, self.registry)?)
    }

    fn paint(&self, id: NodeId, ctx: &mut dyn DrawingContext) -> Result<(), TreeError> {
        let node = self.arena.node(id)?;
        if node.layout.state != LayoutState::Arranged {
            return Err(TreeError::NotArranged(id));
        }
        let bounds = node.layout.bounds;

        let background: Color = self.prop(node, self.props.background)?;
        if is_paintable(bounds, background) {
            skip_failed(id, "fill_rectangle", ctx.fill_rectangle(bounds, background));
        }

        match node.kind {
            NodeKind::Border => {
                let thickness = self.prop(node, self.props.border_thickness)?;
                let brush = self.prop(node, self.props.border_brush)?;
                if thickness > 0.0 && !is_transparent(brush) && is_visible_rect(bounds) {
                    let radius = self.prop(node, self.props.corner_radius)?;
                    let pen = Pen::new(brush, thickness);
                    skip_failed(
                        id,
                        "draw_rounded_rectangle",
                        ctx.draw_rounded_rectangle(bounds, &pen, radius),
                    );
                }
            }
            NodeKind::TextBlock => {
                let text = self.prop(node, self.props.text)?;
                let foreground = self.prop(node, self.props.foreground)?;
                if !text.is_empty() && !is_transparent(foreground) && is_visible_rect(bounds) {
                    skip_failed(
                        id,
                        "draw_text",
                        ctx.draw_text(bounds.origin(), foreground, &text),
                    );
                }
            }
            NodeKind::Grid | NodeKind::StackPanel | NodeKind::Rectangle => {}
            NodeKind::Placeholder => {}
        }

        for &child in &node.children {
            self.paint(child, ctx)?;
        }
        Ok(())
    }
}

fn skip_failed(id: NodeId, primitive: &'static str, result: Result<(), DrawError>) {
    if let Err(error) = result {
        debug!(?id, primitive, %error, "draw call skipped");
    }
}
