// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measure and arrange policies.
//!
//! Measure is memoized on the available size: a node that is not
//! `Unmeasured` and is asked again with the same size returns its cached
//! desired size without running its policy. Arrange measures first when
//! needed, and skips a node that is already arranged to the same rect.

use kurbo::{Insets, Point, Rect, Size};
use tracing::trace;
use trellis_property::{Property, PropertyRegistry, PropertyValue};

use crate::catalog::LayoutProperties;
use crate::config::LayoutConfig;
use crate::error::TreeError;
use crate::grid::{GridLength, StarSizing, resolve_tracks, track_offsets};
use crate::text::TextMeasure;
use crate::tree::{Arena, Tree};
use crate::types::{LayoutState, NodeId, NodeKind, Orientation};

impl Tree {
    /// Computes the desired size of `id` and its subtree.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn measure(&self, id: NodeId, available: Size) -> Result<Size, TreeError> {
        let mut arena = self.arena().borrow_mut();
        self.pass(&mut arena).measure(id, available)
    }

    /// Positions `id` and its subtree within `rect`, in absolute coordinates.
    ///
    /// A node that was never measured is measured against `rect`'s size first.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn arrange(&self, id: NodeId, rect: Rect) -> Result<(), TreeError> {
        let mut arena = self.arena().borrow_mut();
        self.pass(&mut arena).arrange(id, rect)
    }

    /// Measures `root` against `size` and arranges it at the origin.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::measure`].
    pub fn update_layout(&self, root: NodeId, size: Size) -> Result<(), TreeError> {
        let mut arena = self.arena().borrow_mut();
        let mut pass = self.pass(&mut arena);
        pass.measure(root, size)?;
        pass.arrange(root, Rect::from_origin_size(Point::ORIGIN, size))
    }

    /// Marks `id` and its ancestors as needing a new measure.
    ///
    /// Property writes do this on their own; call it when something outside
    /// the tree, such as the text measurer, changed.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn invalidate_measure(&self, id: NodeId) -> Result<(), TreeError> {
        let mut arena = self.arena().borrow_mut();
        arena.node(id)?;
        arena.invalidate_layout(id);
        Ok(())
    }

    /// The desired size from the last measure.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn desired_size(&self, id: NodeId) -> Result<Size, TreeError> {
        Ok(self.arena().borrow().node(id)?.layout.desired)
    }

    /// The rect from the last arrange.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn visual_bounds(&self, id: NodeId) -> Result<Rect, TreeError> {
        Ok(self.arena().borrow().node(id)?.layout.bounds)
    }

    /// Where the node is in the measure/arrange cycle.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleNode`] for a removed node.
    pub fn layout_state(&self, id: NodeId) -> Result<LayoutState, TreeError> {
        Ok(self.arena().borrow().node(id)?.layout.state)
    }

    fn pass<'a>(&'a self, arena: &'a mut Arena) -> LayoutPass<'a> {
        LayoutPass {
            arena,
            registry: self.catalog().registry(),
            props: *self.props(),
            text: self.text_measure(),
            config: *self.config(),
        }
    }
}

struct LayoutPass<'a> {
    arena: &'a mut Arena,
    registry: &'a PropertyRegistry,
    props: LayoutProperties,
    text: &'a dyn TextMeasure,
    config: LayoutConfig,
}

impl LayoutPass<'_> {
    fn prop<T: PropertyValue>(&self, id: NodeId, property: Property<T>) -> Result<T, TreeError> {
        Ok(self.arena.node(id)?.store.get(property, self.registry)?)
    }

    fn children(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        Ok(self.arena.node(id)?.children.clone())
    }

    fn desired(&self, id: NodeId) -> Result<Size, TreeError> {
        Ok(self.arena.node(id)?.layout.desired)
    }

    fn measure(&mut self, id: NodeId, available: Size) -> Result<Size, TreeError> {
        let node = self.arena.node(id)?;
        if node.layout.state != LayoutState::Unmeasured && node.layout.available == Some(available)
        {
            return Ok(node.layout.desired);
        }
        let kind = node.kind;

        let width = self.prop(id, self.props.width)?;
        let height = self.prop(id, self.props.height)?;
        let constrained = Size::new(
            width.unwrap_or(available.width),
            height.unwrap_or(available.height),
        );
        let measured = match kind {
            NodeKind::Border => self.measure_border(id, constrained)?,
            NodeKind::Grid => self.measure_grid(id, constrained)?,
            NodeKind::StackPanel => self.measure_stack(id, constrained)?,
            NodeKind::TextBlock => self.text.measure(&self.prop(id, self.props.text)?),
            NodeKind::Rectangle | NodeKind::Placeholder => Size::ZERO,
        };
        let desired = Size::new(
            width.unwrap_or(measured.width),
            height.unwrap_or(measured.height),
        );

        self.arena.stats.measure_passes += 1;
        let layout = &mut self.arena.node_mut(id)?.layout;
        layout.state = LayoutState::Measured;
        layout.available = Some(available);
        layout.desired = desired;
        trace!(?id, %kind, ?available, ?desired, "measured");
        Ok(desired)
    }

    fn arrange(&mut self, id: NodeId, rect: Rect) -> Result<(), TreeError> {
        if self.arena.node(id)?.layout.state == LayoutState::Unmeasured {
            self.measure(id, rect.size())?;
        }
        let node = self.arena.node(id)?;
        if node.layout.state == LayoutState::Arranged && node.layout.bounds == rect {
            return Ok(());
        }
        let kind = node.kind;
        match kind {
            NodeKind::Border => {
                let insets = self.border_insets(id)?;
                if let Some(child) = self.children(id)?.first().copied() {
                    self.arrange(child, deflate_rect(rect, insets))?;
                }
            }
            NodeKind::Grid => self.arrange_grid(id, rect)?,
            NodeKind::StackPanel => self.arrange_stack(id, rect)?,
            NodeKind::TextBlock | NodeKind::Rectangle | NodeKind::Placeholder => {}
        }

        self.arena.stats.arrange_passes += 1;
        let layout = &mut self.arena.node_mut(id)?.layout;
        layout.state = LayoutState::Arranged;
        layout.bounds = rect;
        trace!(?id, %kind, ?rect, "arranged");
        Ok(())
    }

    // --- Border --------------------------------------------------------------

    /// Padding plus the uniform border thickness on every side.
    fn border_insets(&self, id: NodeId) -> Result<Insets, TreeError> {
        let padding = self.prop(id, self.props.padding)?;
        let thickness = self.prop(id, self.props.border_thickness)?;
        Ok(Insets::new(
            padding.x0 + thickness,
            padding.y0 + thickness,
            padding.x1 + thickness,
            padding.y1 + thickness,
        ))
    }

    fn measure_border(&mut self, id: NodeId, available: Size) -> Result<Size, TreeError> {
        let insets = self.border_insets(id)?;
        let inner = Size::new(
            (available.width - insets.x_value()).max(0.0),
            (available.height - insets.y_value()).max(0.0),
        );
        let chrome = Size::new(insets.x_value(), insets.y_value());
        match self.children(id)?.first().copied() {
            Some(child) => Ok(self.measure(child, inner)? + chrome),
            None => Ok(chrome),
        }
    }

    // --- StackPanel ----------------------------------------------------------

    fn measure_stack(&mut self, id: NodeId, available: Size) -> Result<Size, TreeError> {
        let orientation = self.prop(id, self.props.orientation)?;
        let (_, across) = split(orientation, available);
        // Unbounded along the stacking direction.
        let slot = join(orientation, f64::INFINITY, across);
        let mut total = 0.0_f64;
        let mut thickest = 0.0_f64;
        for child in self.children(id)? {
            let desired = self.measure(child, slot)?;
            let (main, cross) = split(orientation, desired);
            total += main;
            thickest = thickest.max(cross);
        }
        Ok(join(orientation, total, thickest))
    }

    fn arrange_stack(&mut self, id: NodeId, rect: Rect) -> Result<(), TreeError> {
        let orientation = self.prop(id, self.props.orientation)?;
        let mut cursor = match orientation {
            Orientation::Vertical => rect.y0,
            Orientation::Horizontal => rect.x0,
        };
        for child in self.children(id)? {
            let (main, _) = split(orientation, self.desired(child)?);
            let slot = match orientation {
                Orientation::Vertical => Rect::new(rect.x0, cursor, rect.x1, cursor + main),
                Orientation::Horizontal => Rect::new(cursor, rect.y0, cursor + main, rect.y1),
            };
            self.arrange(child, slot)?;
            cursor += main;
        }
        Ok(())
    }

    // --- Grid ----------------------------------------------------------------

    fn grid_tracks(
        &self,
        id: NodeId,
    ) -> Result<(Vec<GridLength>, Vec<GridLength>), TreeError> {
        let or_single = |defs: Vec<GridLength>| {
            if defs.is_empty() {
                vec![GridLength::Star(1.0)]
            } else {
                defs
            }
        };
        Ok((
            or_single(self.prop(id, self.props.row_definitions)?),
            or_single(self.prop(id, self.props.column_definitions)?),
        ))
    }

    /// The `(row, column)` of a child, clamped to the last track.
    fn cell(&self, child: NodeId, rows: usize, columns: usize) -> Result<(usize, usize), TreeError> {
        let row = self.prop(child, self.props.row)?;
        let column = self.prop(child, self.props.column)?;
        Ok((row.min(rows - 1), column.min(columns - 1)))
    }

    /// Largest desired size per track, from the children's cached measures.
    fn track_content(
        &self,
        children: &[NodeId],
        rows: usize,
        columns: usize,
    ) -> Result<(Vec<f64>, Vec<f64>), TreeError> {
        let mut row_content = vec![0.0_f64; rows];
        let mut column_content = vec![0.0_f64; columns];
        for &child in children {
            let (row, column) = self.cell(child, rows, columns)?;
            let desired = self.desired(child)?;
            row_content[row] = row_content[row].max(desired.height);
            column_content[column] = column_content[column].max(desired.width);
        }
        Ok((row_content, column_content))
    }

    fn measure_grid(&mut self, id: NodeId, available: Size) -> Result<Size, TreeError> {
        let (rows, columns) = self.grid_tracks(id)?;
        let children = self.children(id)?;
        let spare = Size::new(
            (available.width - pixel_total(&columns)).max(0.0),
            (available.height - pixel_total(&rows)).max(0.0),
        );
        for &child in &children {
            let (row, column) = self.cell(child, rows.len(), columns.len())?;
            let cell = Size::new(
                track_space(columns[column], spare.width),
                track_space(rows[row], spare.height),
            );
            self.measure(child, cell)?;
        }

        let (row_content, column_content) =
            self.track_content(&children, rows.len(), columns.len())?;
        let overflow = self.config.grid_overflow;
        let heights = resolve_tracks(
            &rows,
            &row_content,
            available.height,
            overflow,
            StarSizing::Content,
        );
        let widths = resolve_tracks(
            &columns,
            &column_content,
            available.width,
            overflow,
            StarSizing::Content,
        );
        Ok(Size::new(widths.iter().sum(), heights.iter().sum()))
    }

    fn arrange_grid(&mut self, id: NodeId, rect: Rect) -> Result<(), TreeError> {
        let (rows, columns) = self.grid_tracks(id)?;
        let children = self.children(id)?;
        let (row_content, column_content) =
            self.track_content(&children, rows.len(), columns.len())?;
        let overflow = self.config.grid_overflow;
        let heights = resolve_tracks(
            &rows,
            &row_content,
            rect.height(),
            overflow,
            StarSizing::Share,
        );
        let widths = resolve_tracks(
            &columns,
            &column_content,
            rect.width(),
            overflow,
            StarSizing::Share,
        );
        let tops = track_offsets(&heights);
        let lefts = track_offsets(&widths);

        for child in children {
            let (row, column) = self.cell(child, rows.len(), columns.len())?;
            let origin = Point::new(rect.x0 + lefts[column], rect.y0 + tops[row]);
            let size = Size::new(widths[column], heights[row]);
            self.arrange(child, Rect::from_origin_size(origin, size))?;
        }
        Ok(())
    }
}

/// Space a child may use in a track during measure.
fn track_space(def: GridLength, spare: f64) -> f64 {
    match def {
        GridLength::Pixel(v) => v,
        GridLength::Auto | GridLength::Star(_) => spare,
    }
}

fn pixel_total(defs: &[GridLength]) -> f64 {
    defs.iter()
        .map(|def| match def {
            GridLength::Pixel(v) => *v,
            _ => 0.0,
        })
        .sum()
}

/// `(main, cross)` extents of a size along the stacking direction.
fn split(orientation: Orientation, size: Size) -> (f64, f64) {
    match orientation {
        Orientation::Vertical => (size.height, size.width),
        Orientation::Horizontal => (size.width, size.height),
    }
}

fn join(orientation: Orientation, main: f64, cross: f64) -> Size {
    match orientation {
        Orientation::Vertical => Size::new(cross, main),
        Orientation::Horizontal => Size::new(main, cross),
    }
}

fn deflate_rect(rect: Rect, insets: Insets) -> Rect {
    let x0 = rect.x0 + insets.x0;
    let y0 = rect.y0 + insets.y0;
    Rect::new(x0, y0, (rect.x1 - insets.x1).max(x0), (rect.y1 - insets.y1).max(y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::grid::TrackOverflow;
    use std::rc::Rc;

    fn tree() -> Tree {
        Tree::new(Rc::new(Catalog::new().unwrap()))
    }

    fn fixed(tree: &Tree, w: f64, h: f64) -> NodeId {
        let node = tree.create(NodeKind::Rectangle);
        tree.set(node, tree.props().width, Some(w)).unwrap();
        tree.set(node, tree.props().height, Some(h)).unwrap();
        node
    }

    #[test]
    fn border_adds_padding_and_thickness() {
        let tree = tree();
        let props = *tree.props();
        let border = tree.create(NodeKind::Border);
        tree.set(border, props.padding, Insets::uniform(10.0)).unwrap();
        tree.set(border, props.border_thickness, 2.0).unwrap();
        let child = fixed(&tree, 100.0, 50.0);
        tree.set_child(border, Some(child)).unwrap();

        let desired = tree.measure(border, Size::new(500.0, 500.0)).unwrap();
        assert_eq!(desired, Size::new(124.0, 74.0));

        tree.arrange(border, Rect::new(0.0, 0.0, 124.0, 74.0)).unwrap();
        assert_eq!(
            tree.visual_bounds(child).unwrap(),
            Rect::new(12.0, 12.0, 112.0, 62.0)
        );
    }

    #[test]
    fn empty_border_desires_its_chrome() {
        let tree = tree();
        let border = tree.create(NodeKind::Border);
        tree.set(border, tree.props().padding, Insets::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        assert_eq!(
            tree.measure(border, Size::new(50.0, 50.0)).unwrap(),
            Size::new(4.0, 6.0)
        );
    }

    #[test]
    fn replacing_a_border_child_remeasures_from_the_new_one() {
        let tree = tree();
        let border = tree.create(NodeKind::Border);
        tree.set_child(border, Some(fixed(&tree, 10.0, 10.0))).unwrap();
        assert_eq!(
            tree.measure(border, Size::new(99.0, 99.0)).unwrap(),
            Size::new(10.0, 10.0)
        );

        tree.set_child(border, Some(fixed(&tree, 30.0, 5.0))).unwrap();
        assert_eq!(
            tree.measure(border, Size::new(99.0, 99.0)).unwrap(),
            Size::new(30.0, 5.0)
        );
    }

    #[test]
    fn measure_is_memoized_on_available_size() {
        let tree = tree();
        let border = tree.create(NodeKind::Border);
        let label = tree.create(NodeKind::TextBlock);
        tree.set_child(border, Some(label)).unwrap();
        tree.set(label, tree.props().text, "hello".into()).unwrap();

        let size = Size::new(80.0, 24.0);
        tree.measure(border, size).unwrap();
        assert_eq!(tree.stats().measure_passes, 2);

        tree.reset_stats();
        tree.measure(border, size).unwrap();
        assert_eq!(tree.stats().measure_passes, 0, "nothing changed");

        tree.measure(border, Size::new(40.0, 24.0)).unwrap();
        assert_eq!(
            tree.stats().measure_passes,
            2,
            "a new available size re-runs the subtree"
        );
    }

    #[test]
    fn layout_writes_invalidate_ancestors() {
        let tree = tree();
        let grid = tree.create(NodeKind::Grid);
        let label = tree.create(NodeKind::TextBlock);
        tree.append_child(grid, label).unwrap();
        tree.update_layout(grid, Size::new(80.0, 24.0)).unwrap();
        assert_eq!(tree.layout_state(grid).unwrap(), LayoutState::Arranged);

        tree.set(label, tree.props().text, "changed".into()).unwrap();
        assert_eq!(tree.layout_state(label).unwrap(), LayoutState::Unmeasured);
        assert_eq!(tree.layout_state(grid).unwrap(), LayoutState::Unmeasured);
    }

    #[test]
    fn render_only_writes_keep_the_layout() {
        let tree = tree();
        let label = tree.create(NodeKind::TextBlock);
        tree.update_layout(label, Size::new(10.0, 1.0)).unwrap();

        tree.set(label, tree.props().foreground, peniko::color::palette::css::RED)
            .unwrap();
        assert_eq!(tree.layout_state(label).unwrap(), LayoutState::Arranged);
    }

    #[test]
    fn stack_panel_sums_along_and_maxes_across() {
        let tree = tree();
        let stack = tree.create(NodeKind::StackPanel);
        let a = fixed(&tree, 10.0, 3.0);
        let b = fixed(&tree, 20.0, 4.0);
        tree.append_child(stack, a).unwrap();
        tree.append_child(stack, b).unwrap();

        assert_eq!(
            tree.measure(stack, Size::new(100.0, 100.0)).unwrap(),
            Size::new(20.0, 7.0)
        );
        tree.arrange(stack, Rect::new(5.0, 5.0, 105.0, 105.0)).unwrap();
        assert_eq!(tree.visual_bounds(b).unwrap(), Rect::new(5.0, 8.0, 105.0, 12.0));

        tree.set(stack, tree.props().orientation, Orientation::Horizontal)
            .unwrap();
        assert_eq!(
            tree.measure(stack, Size::new(100.0, 100.0)).unwrap(),
            Size::new(30.0, 4.0)
        );
    }

    #[test]
    fn grid_places_children_in_tracks() {
        let tree = tree();
        let props = *tree.props();
        let grid = tree.create(NodeKind::Grid);
        tree.set(
            grid,
            props.column_definitions,
            GridLength::parse_list("20, *, 2*").unwrap(),
        )
        .unwrap();
        tree.set(grid, props.row_definitions, GridLength::parse_list("auto, *").unwrap())
            .unwrap();

        let header = fixed(&tree, 5.0, 3.0);
        tree.set(header, props.column, 1).unwrap();
        let body = tree.create(NodeKind::Rectangle);
        tree.set(body, props.row, 1).unwrap();
        tree.set(body, props.column, 9).unwrap();
        for child in [header, body] {
            tree.append_child(grid, child).unwrap();
        }

        tree.update_layout(grid, Size::new(80.0, 20.0)).unwrap();
        // Columns: 20 px, then 60 split 1:2. Rows: auto (3), then the rest.
        assert_eq!(
            tree.visual_bounds(header).unwrap(),
            Rect::new(20.0, 0.0, 40.0, 3.0)
        );
        assert_eq!(
            tree.visual_bounds(body).unwrap(),
            Rect::new(40.0, 3.0, 80.0, 20.0),
            "out-of-range column clamps to the last track"
        );
    }

    #[test]
    fn grid_overflow_policy_is_configurable() {
        let catalog = Rc::new(Catalog::new().unwrap());
        let measure_with = |overflow| {
            let tree = Tree::builder(Rc::clone(&catalog))
                .config(LayoutConfig::default().with_grid_overflow(overflow))
                .build();
            let grid = tree.create(NodeKind::Grid);
            tree.set(
                grid,
                tree.props().column_definitions,
                GridLength::parse_list("30, 30").unwrap(),
            )
            .unwrap();
            tree.measure(grid, Size::new(40.0, 10.0)).unwrap().width
        };
        assert_eq!(measure_with(TrackOverflow::ClampLowestPriority), 40.0);
        assert_eq!(measure_with(TrackOverflow::Overflow), 60.0);
    }

    #[test]
    fn arrange_skips_unchanged_subtrees() {
        let tree = tree();
        let stack = tree.create(NodeKind::StackPanel);
        tree.append_child(stack, fixed(&tree, 4.0, 4.0)).unwrap();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        tree.arrange(stack, rect).unwrap();

        tree.reset_stats();
        tree.arrange(stack, rect).unwrap();
        assert_eq!(tree.stats().arrange_passes, 0);
    }

    #[test]
    fn explicit_size_overrides_content() {
        let tree = tree();
        let label = tree.create(NodeKind::TextBlock);
        tree.set(label, tree.props().text, "a long line".into())
            .unwrap();
        tree.set(label, tree.props().width, Some(3.0)).unwrap();
        assert_eq!(
            tree.measure(label, Size::new(50.0, 50.0)).unwrap(),
            Size::new(3.0, 1.0)
        );
    }
}
