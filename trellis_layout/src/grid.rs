// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid track lengths and track sizing.
//!
//! A track list is written as a comma and/or whitespace separated list:
//!
//! | Text    | Length                  |
//! |---------|-------------------------|
//! | `Auto`  | [`GridLength::Auto`]    |
//! | `*`     | [`GridLength::Star`]`(1.0)` |
//! | `2.5*`  | [`GridLength::Star`]`(2.5)` |
//! | `100`   | [`GridLength::Pixel`]`(100.0)` |
//!
//! `Auto` is case-insensitive. Negative or non-finite numbers are rejected.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The size of one grid row or column.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GridLength {
    /// A fixed length.
    Pixel(f64),
    /// A share of the space left after fixed and auto tracks, by weight.
    Star(f64),
    /// The largest desired size among the track's children.
    Auto,
}

impl GridLength {
    /// Parses a track list such as `"Auto, *, 2*, 100"`.
    ///
    /// An empty or all-whitespace string yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns the first entry that is not a valid length.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, GridLengthError> {
        text.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    fn is_class(self, class: TrackClass) -> bool {
        matches!(
            (self, class),
            (Self::Pixel(_), TrackClass::Pixel) | (Self::Auto, TrackClass::Auto)
        )
    }
}

impl FromStr for GridLength {
    type Err = GridLengthError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let invalid = || GridLengthError {
            entry: text.to_owned(),
        };
        if text.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let (number, star) = match text.strip_suffix('*') {
            Some(weight) => (weight.trim(), true),
            None => (text, false),
        };
        let value = if star && number.is_empty() {
            1.0
        } else {
            number.parse::<f64>().map_err(|_| invalid())?
        };
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        Ok(if star { Self::Star(value) } else { Self::Pixel(value) })
    }
}

impl fmt::Display for GridLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixel(v) => write!(f, "{v}"),
            Self::Star(w) if *w == 1.0 => f.write_str("*"),
            Self::Star(w) => write!(f, "{w}*"),
            Self::Auto => f.write_str("Auto"),
        }
    }
}

/// A track list entry that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("`{entry}` is not a grid length (expected `Auto`, `*`, `<n>*` or `<n>`)")]
pub struct GridLengthError {
    /// The offending entry, trimmed.
    pub entry: String,
}

/// What the grid does when fixed and auto tracks ask for more than is available.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackOverflow {
    /// Hand out space to pixel tracks, then auto tracks, each in declaration
    /// order; once it runs out, later tracks get what is left, down to zero.
    /// Star tracks get zero. The total never exceeds a finite available size.
    #[default]
    ClampLowestPriority,
    /// Give every pixel and auto track its full request and let the total
    /// exceed the available size.
    Overflow,
}

/// How star tracks are sized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum StarSizing {
    /// Report the content size (measure pass).
    Content,
    /// Split the remaining space by weight (arrange pass).
    Share,
}

#[derive(Copy, Clone)]
enum TrackClass {
    Pixel,
    Auto,
}

/// Resolves track sizes along one axis.
///
/// `content[i]` is the largest desired size among the children of track `i`.
/// With an infinite `available`, star tracks fall back to their content size.
pub(crate) fn resolve_tracks(
    defs: &[GridLength],
    content: &[f64],
    available: f64,
    overflow: TrackOverflow,
    stars: StarSizing,
) -> Vec<f64> {
    let mut sizes: Vec<f64> = defs
        .iter()
        .zip(content)
        .map(|(def, content)| match def {
            GridLength::Pixel(v) => *v,
            GridLength::Auto => *content,
            GridLength::Star(_) => 0.0,
        })
        .collect();

    let mut remaining = available;
    for class in [TrackClass::Pixel, TrackClass::Auto] {
        for (size, def) in sizes.iter_mut().zip(defs) {
            if !def.is_class(class) {
                continue;
            }
            if overflow == TrackOverflow::ClampLowestPriority {
                *size = size.min(remaining.max(0.0));
            }
            remaining -= *size;
        }
    }
    let remaining = remaining.max(0.0);

    let total_weight: f64 = defs
        .iter()
        .filter_map(|def| match def {
            GridLength::Star(w) => Some(*w),
            _ => None,
        })
        .sum();
    let by_content = stars == StarSizing::Content || !remaining.is_finite();
    let mut star_budget = remaining;
    for ((size, def), content) in sizes.iter_mut().zip(defs).zip(content) {
        let GridLength::Star(weight) = def else {
            continue;
        };
        *size = if by_content {
            *content
        } else if total_weight > 0.0 {
            remaining * weight / total_weight
        } else {
            0.0
        };
        if by_content && overflow == TrackOverflow::ClampLowestPriority {
            // Content-sized stars still only get what the higher classes left.
            *size = size.min(star_budget);
            star_budget -= *size;
        }
    }
    sizes
}

/// Offsets of each track's start, given the sizes.
pub(crate) fn track_offsets(sizes: &[f64]) -> Vec<f64> {
    let mut offset = 0.0;
    sizes
        .iter()
        .map(|size| {
            let start = offset;
            offset += size;
            start
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_the_length_grammar() {
        assert_eq!(
            GridLength::parse_list("Auto, *, 2*, 100").unwrap(),
            vec![
                GridLength::Auto,
                GridLength::Star(1.0),
                GridLength::Star(2.0),
                GridLength::Pixel(100.0),
            ]
        );
        assert_eq!(
            GridLength::parse_list("auto 1.5*").unwrap(),
            vec![GridLength::Auto, GridLength::Star(1.5)]
        );
        assert!(GridLength::parse_list("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_entries() {
        let err = GridLength::parse_list("Auto, -5").unwrap_err();
        assert_eq!(err.entry, "-5");
        assert!(GridLength::parse_list("wide").is_err());
        assert!(GridLength::parse_list("x*").is_err());
        assert!(GridLength::parse_list("inf").is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in ["Auto", "*", "2*", "100"] {
            let length: GridLength = text.parse().unwrap();
            assert_eq!(length.to_string(), text);
        }
    }

    #[test]
    fn stars_split_what_fixed_and_auto_leave() {
        let defs = [
            GridLength::Pixel(100.0),
            GridLength::Auto,
            GridLength::Star(1.0),
            GridLength::Star(3.0),
        ];
        let content = [0.0, 40.0, 10.0, 10.0];
        let sizes = resolve_tracks(
            &defs,
            &content,
            300.0,
            TrackOverflow::ClampLowestPriority,
            StarSizing::Share,
        );
        assert_eq!(sizes, vec![100.0, 40.0, 40.0, 120.0]);
        assert_eq!(track_offsets(&sizes), vec![0.0, 100.0, 140.0, 180.0]);
    }

    #[test]
    fn measure_reports_star_content() {
        let defs = [GridLength::Star(1.0), GridLength::Star(1.0)];
        let sizes = resolve_tracks(
            &defs,
            &[30.0, 50.0],
            f64::INFINITY,
            TrackOverflow::ClampLowestPriority,
            StarSizing::Content,
        );
        assert_eq!(sizes, vec![30.0, 50.0]);
    }

    #[test]
    fn clamping_starves_later_tracks_first() {
        let defs = [
            GridLength::Auto,
            GridLength::Pixel(80.0),
            GridLength::Pixel(80.0),
            GridLength::Star(1.0),
        ];
        let sizes = resolve_tracks(
            &defs,
            &[50.0, 0.0, 0.0, 0.0],
            100.0,
            TrackOverflow::ClampLowestPriority,
            StarSizing::Share,
        );
        // Pixel tracks outrank auto: 80, then 20, then nothing for auto or star.
        assert_eq!(sizes, vec![0.0, 80.0, 20.0, 0.0]);
    }

    #[test]
    fn overflow_keeps_requests() {
        let defs = [GridLength::Pixel(80.0), GridLength::Auto, GridLength::Star(1.0)];
        let sizes = resolve_tracks(
            &defs,
            &[0.0, 50.0, 0.0],
            100.0,
            TrackOverflow::Overflow,
            StarSizing::Share,
        );
        assert_eq!(sizes, vec![80.0, 50.0, 0.0]);
    }

    fn length() -> impl Strategy<Value = GridLength> {
        prop_oneof![
            Just(GridLength::Auto),
            (0.0_f64..200.0).prop_map(GridLength::Pixel),
            (0.1_f64..5.0).prop_map(GridLength::Star),
        ]
    }

    proptest! {
        #[test]
        fn clamped_tracks_fit_the_available_space(
            defs in proptest::collection::vec(length(), 1..8),
            content in proptest::collection::vec(0.0_f64..200.0, 8),
            available in 0.0_f64..600.0,
        ) {
            for stars in [StarSizing::Content, StarSizing::Share] {
                let sizes = resolve_tracks(
                    &defs,
                    &content[..defs.len()],
                    available,
                    TrackOverflow::ClampLowestPriority,
                    stars,
                );
                prop_assert_eq!(sizes.len(), defs.len());
                prop_assert!(sizes.iter().all(|s| *s >= 0.0));
                let total: f64 = sizes.iter().sum();
                prop_assert!(total <= available + 1e-6, "total {} > {}", total, available);
            }
        }
    }
}
