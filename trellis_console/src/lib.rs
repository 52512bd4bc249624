// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Console: a drawing context backed by a grid of console cells.
//!
//! [`ConsoleCanvas`] implements [`DrawingContext`](trellis_layout::DrawingContext)
//! with solid rectangle fills only. Colors map to the nearest of the 16
//! [`ConsoleColor`]s, and the result can be written to a terminal with
//! [`ConsoleCanvas::write_ansi`].
//!
//! ```rust
//! use kurbo::Rect;
//! use peniko::color::palette::css;
//! use trellis_console::{ConsoleCanvas, ConsoleColor};
//! use trellis_layout::DrawingContext;
//!
//! let mut canvas = ConsoleCanvas::new(8, 2);
//! canvas.fill_rectangle(Rect::new(0.0, 0.0, 4.0, 1.0), css::YELLOW).unwrap();
//! assert_eq!(canvas.cell(3, 0), Some(ConsoleColor::Yellow));
//! assert_eq!(canvas.cell(4, 0), None);
//! ```

mod canvas;
mod color;

pub use canvas::ConsoleCanvas;
pub use color::ConsoleColor;
