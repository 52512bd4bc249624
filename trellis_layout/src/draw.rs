// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-context capability consumed by [`Tree::render`](crate::Tree::render).
//!
//! Surfaces implement [`DrawingContext`]. A surface may leave primitives
//! unimplemented, returning `Ok(())` or [`DrawError::Unsupported`], but must
//! say which in its documentation. [`RecordingContext`] implements every
//! primitive by recording the calls, for tests and debugging.

use kurbo::{Point, Rect};
use peniko::Color;
use thiserror::Error;

/// Stroke used for outlines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pen {
    /// Stroke color.
    pub brush: Color,
    /// Stroke width.
    pub thickness: f64,
}

impl Pen {
    /// A pen with the given color and width.
    #[must_use]
    pub const fn new(brush: Color, thickness: f64) -> Self {
        Self { brush, thickness }
    }
}

/// Failure of one drawing primitive.
///
/// Rendering logs these and moves on to the next call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DrawError {
    /// The surface does not implement this primitive.
    #[error("`{0}` is not supported by this surface")]
    Unsupported(&'static str),
    /// The shape cannot be drawn, for example a rectangle with NaN edges.
    #[error("degenerate shape")]
    Degenerate,
    /// The surface itself failed.
    #[error("surface error: {0}")]
    Surface(String),
}

/// Platform drawing surface, borrowed for the duration of a render pass.
pub trait DrawingContext {
    /// Fills `bounds` with a solid color.
    ///
    /// # Errors
    ///
    /// Any [`DrawError`]; the caller skips the call.
    fn fill_rectangle(&mut self, bounds: Rect, color: Color) -> Result<(), DrawError>;

    /// Strokes the outline of a rounded rectangle.
    ///
    /// # Errors
    ///
    /// Any [`DrawError`]; the caller skips the call.
    fn draw_rounded_rectangle(
        &mut self,
        bounds: Rect,
        pen: &Pen,
        corner_radius: f64,
    ) -> Result<(), DrawError>;

    /// Draws `text` with its top-left corner at `origin`.
    ///
    /// # Errors
    ///
    /// Any [`DrawError`]; the caller skips the call.
    fn draw_text(&mut self, origin: Point, brush: Color, text: &str) -> Result<(), DrawError>;
}

/// Returns `true` when a fill of `bounds` with `color` would be visible.
///
/// Zero or negative area, NaN edges and fully transparent colors are not.
#[must_use]
pub fn is_paintable(bounds: Rect, color: Color) -> bool {
    is_visible_rect(bounds) && !is_transparent(color)
}

pub(crate) fn is_visible_rect(bounds: Rect) -> bool {
    bounds.width() > 0.0 && bounds.height() > 0.0
}

pub(crate) fn is_transparent(color: Color) -> bool {
    color.components[3] <= 0.0
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`DrawingContext::fill_rectangle`].
    FillRectangle {
        /// Filled area.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`DrawingContext::draw_rounded_rectangle`].
    RoundedRectangle {
        /// Outlined area.
        bounds: Rect,
        /// Stroke.
        pen: Pen,
        /// Corner radius.
        corner_radius: f64,
    },
    /// [`DrawingContext::draw_text`].
    Text {
        /// Top-left corner.
        origin: Point,
        /// Text color.
        brush: Color,
        /// The string drawn.
        text: String,
    },
}

/// A [`DrawingContext`] that records every call instead of drawing.
///
/// It does not rasterize anything and accepts every primitive.
///
/// ```rust
/// use kurbo::Rect;
/// use peniko::color::palette::css;
/// use trellis_layout::{DrawCommand, DrawingContext, RecordingContext};
///
/// let mut ctx = RecordingContext::new();
/// ctx.fill_rectangle(Rect::new(0.0, 0.0, 4.0, 2.0), css::RED).unwrap();
/// assert_eq!(ctx.len(), 1);
/// assert!(matches!(ctx.commands()[0], DrawCommand::FillRectangle { .. }));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    fail_with: Option<DrawError>,
}

impl RecordingContext {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that records nothing and fails every call with `error`.
    #[must_use]
    pub fn failing(error: DrawError) -> Self {
        Self {
            commands: Vec::new(),
            fail_with: Some(error),
        }
    }

    /// The calls recorded so far, in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The strings passed to [`DrawingContext::draw_text`], in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Forgets every recorded call.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, command: DrawCommand) -> Result<(), DrawError> {
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => {
                self.commands.push(command);
                Ok(())
            }
        }
    }
}

impl DrawingContext for RecordingContext {
    fn fill_rectangle(&mut self, bounds: Rect, color: Color) -> Result<(), DrawError> {
        self.record(DrawCommand::FillRectangle { bounds, color })
    }

    fn draw_rounded_rectangle(
        &mut self,
        bounds: Rect,
        pen: &Pen,
        corner_radius: f64,
    ) -> Result<(), DrawError> {
        self.record(DrawCommand::RoundedRectangle {
            bounds,
            pen: *pen,
            corner_radius,
        })
    }

    fn draw_text(&mut self, origin: Point, brush: Color, text: &str) -> Result<(), DrawError> {
        self.record(DrawCommand::Text {
            origin,
            brush,
            text: text.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::palette::css;

    #[test]
    fn paintable_needs_area_and_alpha() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(is_paintable(rect, css::RED));
        assert!(!is_paintable(rect, css::TRANSPARENT));
        assert!(!is_paintable(Rect::new(0.0, 0.0, 0.0, 10.0), css::RED));
        assert!(!is_paintable(Rect::new(5.0, 5.0, 1.0, 1.0), css::RED));
        assert!(!is_paintable(Rect::new(0.0, 0.0, f64::NAN, 1.0), css::RED));
    }

    #[test]
    fn failing_recorder_records_nothing() {
        let mut ctx = RecordingContext::failing(DrawError::Degenerate);
        let result = ctx.draw_text(Point::ZERO, css::BLACK, "x");
        assert_eq!(result, Err(DrawError::Degenerate));
        assert!(ctx.is_empty());
    }

    #[test]
    fn texts_lists_only_text_calls() {
        let mut ctx = RecordingContext::new();
        ctx.fill_rectangle(Rect::new(0.0, 0.0, 1.0, 1.0), css::RED)
            .unwrap();
        ctx.draw_text(Point::ZERO, css::BLACK, "hello").unwrap();
        assert_eq!(ctx.texts(), vec!["hello"]);
        ctx.clear();
        assert!(ctx.is_empty());
    }
}
