// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use peniko::color::palette::css;

/// Host settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HostConfig {
    /// Text color of the load-failure diagnostic. Red by default.
    pub diagnostic_color: Color,
    /// Depth limit passed to the template inflator. 16 by default.
    pub max_template_depth: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            diagnostic_color: css::RED,
            max_template_depth: 16,
        }
    }
}

impl HostConfig {
    /// Sets the diagnostic text color.
    #[must_use]
    pub fn with_diagnostic_color(mut self, color: Color) -> Self {
        self.diagnostic_color = color;
        self
    }

    /// Sets the template depth limit.
    #[must_use]
    pub fn with_max_template_depth(mut self, depth: usize) -> Self {
        self.max_template_depth = depth;
        self
    }
}
