// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::ops::Range;

use kurbo::{Point, Rect, Size};
use peniko::Color;
use tracing::trace;
use trellis_layout::{DrawError, DrawingContext, Pen, is_paintable};

use crate::color::ConsoleColor;

/// Glyph written for a painted cell.
const BLOCK: char = '\u{2588}';

/// A grid of console cells that layout trees render into.
///
/// One unit of layout space is one cell. A fill covers the cells whose
/// centers lie inside the rectangle, clipped to the canvas.
///
/// Only [`fill_rectangle`](DrawingContext::fill_rectangle) draws anything.
/// [`draw_rounded_rectangle`](DrawingContext::draw_rounded_rectangle) and
/// [`draw_text`](DrawingContext::draw_text) are accepted and ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleCanvas {
    width: usize,
    height: usize,
    cells: Vec<Option<ConsoleColor>>,
}

impl ConsoleCanvas {
    /// A blank canvas of `width` by `height` cells.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The canvas extent in layout units.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// The color painted at `(x, y)`, or `None` for a blank or out-of-range cell.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<ConsoleColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    /// Blanks every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Writes the canvas as rows of block glyphs with SGR foreground colors.
    ///
    /// Blank cells are spaces. Colors are reset before a blank cell and at the
    /// end of each row.
    ///
    /// # Errors
    ///
    /// Any error from `out`.
    pub fn write_ansi(&self, out: &mut impl io::Write) -> io::Result<()> {
        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            let mut current = None;
            for &cell in row {
                match cell {
                    Some(color) => {
                        if current != Some(color) {
                            write!(out, "\x1b[{}m", color.sgr_foreground())?;
                            current = Some(color);
                        }
                        write!(out, "{BLOCK}")?;
                    }
                    None => {
                        if current.take().is_some() {
                            out.write_all(b"\x1b[0m")?;
                        }
                        out.write_all(b" ")?;
                    }
                }
            }
            if current.is_some() {
                out.write_all(b"\x1b[0m")?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "edges are clamped to the canvas extent"
    )]
    fn span(start: f64, end: f64, limit: usize) -> Range<usize> {
        let clamp = |edge: f64| (edge - 0.5).ceil().clamp(0.0, limit as f64) as usize;
        clamp(start)..clamp(end)
    }
}

impl DrawingContext for ConsoleCanvas {
    fn fill_rectangle(&mut self, bounds: Rect, color: Color) -> Result<(), DrawError> {
        if !is_paintable(bounds, color) {
            return Ok(());
        }
        let console = ConsoleColor::closest(color);
        let columns = Self::span(bounds.x0, bounds.x1, self.width);
        let rows = Self::span(bounds.y0, bounds.y1, self.height);
        trace!(?bounds, ?console, ?columns, ?rows, "console fill");
        for y in rows {
            let row = y * self.width;
            self.cells[row + columns.start..row + columns.end].fill(Some(console));
        }
        Ok(())
    }

    fn draw_rounded_rectangle(
        &mut self,
        _bounds: Rect,
        _pen: &Pen,
        _corner_radius: f64,
    ) -> Result<(), DrawError> {
        Ok(())
    }

    fn draw_text(&mut self, _origin: Point, _brush: Color, _text: &str) -> Result<(), DrawError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::palette::css;
    use std::rc::Rc;
    use trellis_layout::{Catalog, NodeKind, Tree};

    fn painted(canvas: &ConsoleCanvas) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.cell(x, y).is_some() {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn fills_cover_cells_whose_centers_are_inside() {
        let mut canvas = ConsoleCanvas::new(6, 4);
        canvas
            .fill_rectangle(Rect::new(1.0, 1.0, 3.0, 2.0), css::RED)
            .unwrap();
        assert_eq!(painted(&canvas), vec![(1, 1), (2, 1)]);
        assert_eq!(canvas.cell(1, 1), Some(ConsoleColor::Red));

        canvas.clear();
        canvas
            .fill_rectangle(Rect::new(0.4, 0.0, 1.6, 1.0), css::RED)
            .unwrap();
        assert_eq!(painted(&canvas), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn fills_are_clipped_to_the_canvas() {
        let mut canvas = ConsoleCanvas::new(3, 2);
        canvas
            .fill_rectangle(Rect::new(-5.0, -5.0, 50.0, 50.0), css::BLUE)
            .unwrap();
        assert_eq!(painted(&canvas).len(), 6);
        assert_eq!(canvas.cell(3, 0), None);

        let mut canvas = ConsoleCanvas::new(3, 2);
        canvas
            .fill_rectangle(Rect::new(10.0, 10.0, 12.0, 12.0), css::BLUE)
            .unwrap();
        assert!(painted(&canvas).is_empty());
    }

    #[test]
    fn invisible_fills_and_other_primitives_are_ignored() {
        let mut canvas = ConsoleCanvas::new(4, 4);
        let rect = Rect::new(0.0, 0.0, 4.0, 4.0);
        canvas.fill_rectangle(rect, css::TRANSPARENT).unwrap();
        canvas
            .fill_rectangle(Rect::new(2.0, 2.0, 2.0, 4.0), css::RED)
            .unwrap();
        canvas
            .draw_rounded_rectangle(rect, &Pen::new(css::RED, 1.0), 2.0)
            .unwrap();
        canvas.draw_text(Point::ZERO, css::RED, "hi").unwrap();
        assert!(painted(&canvas).is_empty());
    }

    #[test]
    fn ansi_output_switches_color_only_on_change() {
        let mut canvas = ConsoleCanvas::new(4, 2);
        canvas
            .fill_rectangle(Rect::new(0.0, 0.0, 2.0, 1.0), css::RED)
            .unwrap();
        canvas
            .fill_rectangle(Rect::new(3.0, 1.0, 4.0, 2.0), css::BLUE)
            .unwrap();
        let mut out = Vec::new();
        canvas.write_ansi(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[91m\u{2588}\u{2588}\x1b[0m  \n   \x1b[94m\u{2588}\x1b[0m\n"
        );
    }

    #[test]
    fn renders_a_layout_tree() {
        let tree = Tree::new(Rc::new(Catalog::new().unwrap()));
        let props = *tree.props();
        let border = tree.create(NodeKind::Border);
        tree.set(border, props.background, css::GREEN).unwrap();
        tree.set(border, props.width, Some(3.0)).unwrap();
        tree.set(border, props.height, Some(2.0)).unwrap();

        let mut canvas = ConsoleCanvas::new(5, 3);
        tree.update_layout(border, Size::new(3.0, 2.0)).unwrap();
        tree.render(border, &mut canvas).unwrap();
        assert_eq!(
            painted(&canvas),
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
        assert_eq!(canvas.cell(0, 0), Some(ConsoleColor::DarkGreen));
    }
}
