//! Value-to-color mapping.
//!
//! A `Palette` is an ordered list of anchor colors interpolated with equal
//! spacing over [0, 1]; a `ValueRange` normalizes raw weight-percent values
//! into that interval. Both are pure data, recomputed on every selection
//! change.

use egui::Color32;

/// Anchor colors of the default gradient: red, yellow, green, cyan, blue,
/// magenta.
pub const RAINBOW_ANCHORS: [Color32; 6] = [
    Color32::from_rgb(0xFF, 0x00, 0x00),
    Color32::from_rgb(0xFF, 0xFF, 0x00),
    Color32::from_rgb(0x00, 0xFF, 0x00),
    Color32::from_rgb(0x00, 0xFF, 0xFF),
    Color32::from_rgb(0x00, 0x00, 0xFF),
    Color32::from_rgb(0xFF, 0x00, 0xFF),
];

/// The (min, max) of a column's defined values.
///
/// Invariant: `min <= max`. Undefined values never participate; an
/// all-undefined column has no range at all (`compute` returns `None`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Fold the defined values of a column into a range.
    ///
    /// `None` entries and non-finite numbers are excluded before the fold;
    /// if nothing remains there is no range.
    pub fn compute<I>(values: I) -> Option<ValueRange>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values.into_iter().flatten() {
            if v.is_finite() {
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
        }

        if min.is_finite() && max.is_finite() {
            Some(ValueRange { min, max })
        } else {
            None
        }
    }

    /// Linearly normalize `v` into [0, 1], clamped.
    ///
    /// Out-of-range inputs do not occur in practice (the range derives from
    /// the same column being colored) but are clamped anyway. A degenerate
    /// range maps every value to 0.0.
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if !v.is_finite() || span.abs() < f64::EPSILON {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

/// An ordered list of anchor colors defining a continuous gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    anchors: Vec<Color32>,
}

impl Palette {
    /// The six-anchor rainbow gradient.
    pub fn rainbow() -> Self {
        Self { anchors: RAINBOW_ANCHORS.to_vec() }
    }

    /// Build a palette from explicit anchors. Needs at least two.
    pub fn from_anchors(anchors: Vec<Color32>) -> Self {
        assert!(anchors.len() >= 2, "a gradient needs at least two anchors");
        Self { anchors }
    }

    /// First anchor (the color of the range minimum).
    pub fn start(&self) -> Color32 {
        self.anchors[0]
    }

    /// Last anchor (the color of the range maximum).
    pub fn end(&self) -> Color32 {
        self.anchors[self.anchors.len() - 1]
    }

    /// Sample the gradient at `t` in [0, 1], clamped.
    ///
    /// Anchors are spaced evenly; values between two anchors interpolate
    /// linearly per channel.
    pub fn sample(&self, t: f64) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let segments = (self.anchors.len() - 1) as f64;

        let scaled = t * segments;
        let i = (scaled as usize).min(self.anchors.len() - 2);
        let s = scaled - i as f64;

        let a = self.anchors[i];
        let b = self.anchors[i + 1];
        Color32::from_rgb(
            lerp_channel(a.r(), b.r(), s),
            lerp_channel(a.g(), b.g(), s),
            lerp_channel(a.b(), b.b(), s),
        )
    }

    /// Map a raw value through `range` onto the gradient.
    pub fn color_for(&self, value: f64, range: ValueRange) -> Color32 {
        self.sample(range.normalize(value))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::rainbow()
    }
}

fn lerp_channel(a: u8, b: u8, s: f64) -> u8 {
    (a as f64 + s * (b as f64 - a as f64)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_excludes_undefined_values() {
        let range = ValueRange::compute([Some(1.0), None, Some(3.0)]);
        assert_eq!(range, Some(ValueRange { min: 1.0, max: 3.0 }));
    }

    #[test]
    fn range_excludes_non_finite_values() {
        let range = ValueRange::compute([Some(f64::NAN), Some(2.0), Some(f64::INFINITY)]);
        assert_eq!(range, Some(ValueRange { min: 2.0, max: 2.0 }));
    }

    #[test]
    fn all_undefined_column_has_no_range() {
        assert_eq!(ValueRange::compute([None, None]), None);
        assert_eq!(ValueRange::compute(std::iter::empty()), None);
    }

    #[test]
    fn normalize_endpoints_and_clamp() {
        let range = ValueRange { min: 0.5, max: 1.5 };
        assert_eq!(range.normalize(0.5), 0.0);
        assert_eq!(range.normalize(1.5), 1.0);
        assert_eq!(range.normalize(1.0), 0.5);
        assert_eq!(range.normalize(-10.0), 0.0);
        assert_eq!(range.normalize(10.0), 1.0);
    }

    #[test]
    fn degenerate_range_normalizes_to_zero() {
        let range = ValueRange { min: 2.0, max: 2.0 };
        assert_eq!(range.normalize(2.0), 0.0);
    }

    #[test]
    fn sample_hits_anchors_at_endpoints() {
        let palette = Palette::rainbow();
        assert_eq!(palette.sample(0.0), palette.start());
        assert_eq!(palette.sample(1.0), palette.end());
        assert_eq!(palette.start(), Color32::from_rgb(255, 0, 0));
        assert_eq!(palette.end(), Color32::from_rgb(255, 0, 255));
    }

    #[test]
    fn sample_clamps_out_of_range() {
        let palette = Palette::rainbow();
        assert_eq!(palette.sample(-1.0), palette.sample(0.0));
        assert_eq!(palette.sample(2.0), palette.sample(1.0));
    }

    #[test]
    fn sample_interpolates_between_anchors() {
        let palette = Palette::from_anchors(vec![
            Color32::from_rgb(0, 0, 0),
            Color32::from_rgb(255, 0, 0),
        ]);
        assert_eq!(palette.sample(0.5), Color32::from_rgb(128, 0, 0));
    }

    #[test]
    fn gradient_is_continuous() {
        let palette = Palette::rainbow();
        let steps = 256;
        for i in 1..steps {
            let t0 = (i - 1) as f64 / (steps - 1) as f64;
            let t1 = i as f64 / (steps - 1) as f64;
            let c0 = palette.sample(t0);
            let c1 = palette.sample(t1);
            for (a, b) in [(c0.r(), c1.r()), (c0.g(), c1.g()), (c0.b(), c1.b())] {
                let diff = (a as i32 - b as i32).abs();
                assert!(diff <= 8, "channel jumped by {diff} between t={t0} and t={t1}");
            }
        }
    }

    #[test]
    fn color_for_maps_range_endpoints_to_first_and_last_anchor() {
        let palette = Palette::rainbow();
        let range = ValueRange { min: 0.5, max: 1.5 };
        assert_eq!(palette.color_for(0.5, range), palette.start());
        assert_eq!(palette.color_for(1.5, range), palette.end());
    }
}
