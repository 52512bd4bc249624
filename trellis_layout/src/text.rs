// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;
use unicode_width::UnicodeWidthStr;

/// Opaque text measurement, supplied by the host.
///
/// Shaping and fonts live behind this trait; the tree only needs a size.
pub trait TextMeasure {
    /// The size `text` needs when laid out without wrapping.
    fn measure(&self, text: &str) -> Size;
}

/// Measures text on a fixed grid of cells, as a terminal does.
///
/// Each line is as wide as its display width in columns (wide glyphs count
/// twice), and as tall as one cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MonospaceMeasure {
    /// Size of one cell.
    pub cell: Size,
}

impl MonospaceMeasure {
    /// A measurer with the given cell size.
    #[must_use]
    pub const fn new(cell: Size) -> Self {
        Self { cell }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(Size::new(1.0, 1.0))
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let (columns, lines) = text
            .lines()
            .fold((0_usize, 0_usize), |(columns, lines), line| {
                (columns.max(line.width()), lines + 1)
            });
        Size::new(
            columns as f64 * self.cell.width,
            lines.max(1) as f64 * self.cell.height,
        )
    }
}
