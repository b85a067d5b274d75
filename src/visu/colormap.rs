//! Named color lookup tables.

use image::Rgb;

/// Number of entries in every lookup table.
pub const LUT_SIZE: usize = 256;

/// A color lookup table sampled at [`LUT_SIZE`] evenly spaced positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    lut: Vec<Rgb<u8>>,
}

impl ColorRamp {
    /// Build a ramp by linear interpolation between evenly spaced anchors.
    ///
    /// A single anchor yields a constant ramp; an empty slice yields black.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_anchors(anchors: &[[u8; 3]]) -> Self {
        let lut = match anchors {
            [] => vec![Rgb([0, 0, 0]); LUT_SIZE],
            [only] => vec![Rgb(*only); LUT_SIZE],
            _ => {
                let segments = (anchors.len() - 1) as f32;
                (0..LUT_SIZE)
                    .map(|i| {
                        let pos = i as f32 / (LUT_SIZE - 1) as f32 * segments;
                        let lower = (pos.floor() as usize).min(anchors.len() - 2);
                        let frac = pos - lower as f32;
                        let (a, b) = (anchors[lower], anchors[lower + 1]);
                        // Safe: interpolation between two u8 values stays in [0, 255]
                        Rgb(std::array::from_fn(|c| {
                            f32::from(a[c])
                                .mul_add(1.0 - frac, f32::from(b[c]) * frac)
                                .round()
                                .clamp(0.0, 255.0) as u8
                        }))
                    })
                    .collect()
            }
        };
        Self { lut }
    }

    /// Color at normalised position `t`, clamped to `[0, 1]`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn sample(&self, t: f32) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        // Safe: t is in [0, 1], so the index is in [0, LUT_SIZE - 1]
        let index = (t * (LUT_SIZE - 1) as f32).round() as usize;
        self.lut[index]
    }

    /// The lowest color of the ramp.
    #[must_use]
    pub fn first(&self) -> Rgb<u8> {
        self.lut[0]
    }

    /// The highest color of the ramp.
    #[must_use]
    pub fn last(&self) -> Rgb<u8> {
        self.lut[LUT_SIZE - 1]
    }
}

/// A catalog of named color ramps.
pub trait ColormapRegistry {
    /// Look up a ramp by its exact name.
    fn lookup(&self, name: &str) -> Option<ColorRamp>;

    /// All names the registry knows.
    fn names(&self) -> Vec<&str>;
}

/// Ramps shipped with the crate, approximating the matplotlib maps of the
/// same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinColormaps;

const BUILTIN: &[(&str, &[[u8; 3]])] = &[
    (
        "viridis",
        &[
            [68, 1, 84],
            [71, 44, 122],
            [59, 81, 139],
            [44, 113, 142],
            [33, 144, 141],
            [39, 173, 129],
            [92, 200, 99],
            [170, 220, 50],
            [253, 231, 37],
        ],
    ),
    (
        "magma",
        &[
            [0, 0, 4],
            [28, 16, 68],
            [79, 18, 123],
            [129, 37, 129],
            [181, 54, 122],
            [229, 80, 100],
            [251, 135, 97],
            [254, 194, 135],
            [252, 253, 191],
        ],
    ),
    (
        "inferno",
        &[
            [0, 0, 4],
            [31, 12, 72],
            [85, 15, 109],
            [136, 34, 106],
            [186, 54, 85],
            [227, 89, 51],
            [249, 140, 10],
            [249, 201, 50],
            [252, 255, 164],
        ],
    ),
    (
        "plasma",
        &[
            [13, 8, 135],
            [84, 2, 163],
            [139, 10, 165],
            [185, 50, 137],
            [219, 92, 104],
            [244, 136, 73],
            [254, 188, 43],
            [240, 249, 33],
        ],
    ),
    (
        "twilight",
        &[
            [226, 217, 226],
            [166, 180, 203],
            [99, 123, 185],
            [84, 61, 155],
            [47, 20, 54],
            [108, 32, 80],
            [172, 79, 81],
            [206, 146, 132],
            [226, 217, 226],
        ],
    ),
    (
        "hsv",
        &[
            [255, 0, 0],
            [255, 255, 0],
            [0, 255, 0],
            [0, 255, 255],
            [0, 0, 255],
            [255, 0, 255],
            [255, 0, 0],
        ],
    ),
    (
        "jet",
        &[
            [0, 0, 128],
            [0, 0, 255],
            [0, 128, 255],
            [0, 255, 255],
            [128, 255, 128],
            [255, 255, 0],
            [255, 128, 0],
            [255, 0, 0],
            [128, 0, 0],
        ],
    ),
    ("hot", &[[0, 0, 0], [255, 0, 0], [255, 255, 0], [255, 255, 255]]),
    ("gray", &[[0, 0, 0], [255, 255, 255]]),
    (
        "Blues",
        &[
            [247, 251, 255],
            [222, 235, 247],
            [198, 219, 239],
            [158, 202, 225],
            [107, 174, 214],
            [66, 146, 198],
            [33, 113, 181],
            [8, 81, 156],
            [8, 48, 107],
        ],
    ),
    (
        "Greens",
        &[
            [247, 252, 245],
            [229, 245, 224],
            [199, 233, 192],
            [161, 217, 155],
            [116, 196, 118],
            [65, 171, 93],
            [35, 139, 69],
            [0, 109, 44],
            [0, 68, 27],
        ],
    ),
    (
        "Reds",
        &[
            [255, 245, 240],
            [254, 224, 210],
            [252, 187, 161],
            [252, 146, 114],
            [251, 106, 74],
            [239, 59, 44],
            [203, 24, 29],
            [165, 15, 21],
            [103, 0, 13],
        ],
    ),
];

impl ColormapRegistry for BuiltinColormaps {
    fn lookup(&self, name: &str) -> Option<ColorRamp> {
        BUILTIN
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, anchors)| ColorRamp::from_anchors(anchors))
    }

    fn names(&self) -> Vec<&str> {
        BUILTIN.iter().map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_match_anchors() {
        let ramp = BuiltinColormaps.lookup("viridis").unwrap();
        assert_eq!(ramp.first(), Rgb([68, 1, 84]));
        assert_eq!(ramp.last(), Rgb([253, 231, 37]));
        assert_eq!(ramp.sample(-3.0), ramp.first());
        assert_eq!(ramp.sample(7.0), ramp.last());
    }

    #[test]
    fn test_gray_is_linear() {
        let ramp = BuiltinColormaps.lookup("gray").unwrap();
        assert_eq!(ramp.sample(0.0), Rgb([0, 0, 0]));
        assert_eq!(ramp.sample(0.5), Rgb([128, 128, 128]));
        assert_eq!(ramp.sample(1.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_nan_samples_lowest_color() {
        let ramp = BuiltinColormaps.lookup("magma").unwrap();
        assert_eq!(ramp.sample(f32::NAN), ramp.first());
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(BuiltinColormaps.lookup("Blues").is_some());
        assert!(BuiltinColormaps.lookup("blues").is_none());
        assert!(BuiltinColormaps.lookup("no_such_map").is_none());
        assert!(BuiltinColormaps.names().contains(&"twilight"));
    }

    #[test]
    fn test_degenerate_anchors() {
        assert_eq!(ColorRamp::from_anchors(&[]).last(), Rgb([0, 0, 0]));
        let flat = ColorRamp::from_anchors(&[[9, 8, 7]]);
        assert_eq!(flat.first(), flat.last());
    }
}
