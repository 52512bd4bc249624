// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::grid::TrackOverflow;

/// Tunables for layout policies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutConfig {
    /// What a grid does when its pixel and auto tracks ask for more than the
    /// available size. Defaults to [`TrackOverflow::ClampLowestPriority`].
    pub grid_overflow: TrackOverflow,
}

impl LayoutConfig {
    /// Sets [`LayoutConfig::grid_overflow`].
    #[must_use]
    pub fn with_grid_overflow(mut self, overflow: TrackOverflow) -> Self {
        self.grid_overflow = overflow;
        self
    }
}
