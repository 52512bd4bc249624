// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

/// The 16 classic console colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names are the colors")]
pub enum ConsoleColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl ConsoleColor {
    /// Every console color, in palette order.
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkCyan,
        Self::DarkRed,
        Self::DarkMagenta,
        Self::DarkYellow,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Cyan,
        Self::Red,
        Self::Magenta,
        Self::Yellow,
        Self::White,
    ];

    /// The color's nominal sRGB value.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::DarkBlue => [0, 0, 128],
            Self::DarkGreen => [0, 128, 0],
            Self::DarkCyan => [0, 128, 128],
            Self::DarkRed => [128, 0, 0],
            Self::DarkMagenta => [128, 0, 128],
            Self::DarkYellow => [128, 128, 0],
            Self::Gray => [192, 192, 192],
            Self::DarkGray => [128, 128, 128],
            Self::Blue => [0, 0, 255],
            Self::Green => [0, 255, 0],
            Self::Cyan => [0, 255, 255],
            Self::Red => [255, 0, 0],
            Self::Magenta => [255, 0, 255],
            Self::Yellow => [255, 255, 0],
            Self::White => [255, 255, 255],
        }
    }

    /// SGR foreground parameter (30–37, 90–97).
    #[must_use]
    pub const fn sgr_foreground(self) -> u8 {
        match self {
            Self::Black => 30,
            Self::DarkRed => 31,
            Self::DarkGreen => 32,
            Self::DarkYellow => 33,
            Self::DarkBlue => 34,
            Self::DarkMagenta => 35,
            Self::DarkCyan => 36,
            Self::Gray => 37,
            Self::DarkGray => 90,
            Self::Red => 91,
            Self::Green => 92,
            Self::Yellow => 93,
            Self::Blue => 94,
            Self::Magenta => 95,
            Self::Cyan => 96,
            Self::White => 97,
        }
    }

    /// The console color nearest to `color` by squared RGB distance.
    ///
    /// Alpha is ignored. Ties go to the earlier palette entry.
    #[must_use]
    pub fn closest(color: Color) -> Self {
        let rgba = color.to_rgba8();
        let target = [rgba.r, rgba.g, rgba.b];
        let mut best = Self::Black;
        let mut best_distance = u32::MAX;
        for candidate in Self::ALL {
            let distance = distance_squared(candidate.rgb(), target);
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }
}

fn distance_squared(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&a, b)| {
            let d = u32::from(a.abs_diff(b));
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::palette::css;

    #[test]
    fn palette_entries_map_to_themselves() {
        for color in ConsoleColor::ALL {
            let [r, g, b] = color.rgb();
            assert_eq!(ConsoleColor::closest(Color::from_rgb8(r, g, b)), color);
        }
    }

    #[test]
    fn css_colors_pick_the_nearest_entry() {
        assert_eq!(ConsoleColor::closest(css::RED), ConsoleColor::Red);
        assert_eq!(ConsoleColor::closest(css::GREEN), ConsoleColor::DarkGreen);
        assert_eq!(ConsoleColor::closest(css::NAVY), ConsoleColor::DarkBlue);
        assert_eq!(ConsoleColor::closest(css::ORANGE), ConsoleColor::Yellow);
        assert_eq!(ConsoleColor::closest(css::SILVER), ConsoleColor::Gray);
    }

    #[test]
    fn sgr_codes_are_distinct() {
        let mut codes: Vec<_> = ConsoleColor::ALL.iter().map(|c| c.sgr_foreground()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 16);
    }
}
