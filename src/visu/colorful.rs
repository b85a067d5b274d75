//! Colorful images of 2D tensors.

use image::Rgb;
use ndarray::{Array3, ArrayView2, Ix4};

use crate::error::{Error, Result};

use super::colormap::{BuiltinColormaps, ColorRamp, ColormapRegistry};
use super::expand::expand_height;
use super::ImageBatch;

/// Color of masked and non-finite values.
pub const MASKED_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Options for [`create_image`].
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Value mapped to the lowest color. Defaults to the tensor minimum.
    pub minval: Option<f32>,

    /// Value mapped to the highest color. Defaults to the tensor maximum.
    pub maxval: Option<f32>,

    /// How many times every row is repeated in the output.
    pub expand_height: i64,

    /// How many times the colormap is traversed between `minval` and `maxval`.
    pub cycle_color_map: i64,

    /// Name of the colormap.
    pub cmap: String,

    /// Diagnostic label for the tracing span.
    pub label: Option<String>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            minval: None,
            maxval: None,
            expand_height: 1,
            cycle_color_map: 1,
            cmap: "viridis".to_string(),
            label: None,
        }
    }
}

impl ImageOptions {
    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not finite, if `minval` is not smaller than `maxval`, or if
    /// `expand_height` or `cycle_color_map` is smaller than 1.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        for (name, bound) in [("minval", self.minval), ("maxval", self.maxval)] {
            if bound.is_some_and(|v| !v.is_finite()) {
                return Err(Error::invalid_parameter(name, "must be finite"));
            }
        }
        if let (Some(min), Some(max)) = (self.minval, self.maxval) {
            if !(min < max) {
                return Err(Error::invalid_parameter(
                    "minval",
                    format!("must be smaller than maxval, got {min} and {max}"),
                ));
            }
        }
        if self.expand_height < 1 {
            return Err(Error::invalid_parameter(
                "expand_height",
                format!("must be a positive integer, got {}", self.expand_height),
            ));
        }
        if self.cycle_color_map < 1 {
            return Err(Error::invalid_parameter(
                "cycle_color_map",
                format!("must be a positive integer, got {}", self.cycle_color_map),
            ));
        }
        Ok(())
    }
}

/// Create an image from a 2D tensor with the built-in colormaps.
///
/// # Errors
///
/// See [`create_image_with`].
pub fn create_image(
    tensor: ArrayView2<'_, f32>,
    mask: Option<ArrayView2<'_, bool>>,
    options: &ImageOptions,
) -> Result<ImageBatch> {
    create_image_with(&BuiltinColormaps, tensor, mask, options)
}

/// Create an RGB image batch of shape `[1, H * expand_height, W, 3]` from a
/// 2D tensor `[H, W]`.
///
/// Values are clamped to `[minval, maxval]`, wrapped `cycle_color_map` times
/// over the colormap and looked up in the named colormap. Positions where
/// `mask` is `true` are painted in [`MASKED_COLOR`], as are non-finite values.
///
/// # Errors
///
/// Returns an error if the mask shape differs from the tensor shape, if the
/// options are invalid, if the resolved value range is inverted, or if the
/// colormap is unknown.
pub fn create_image_with(
    registry: &impl ColormapRegistry,
    tensor: ArrayView2<'_, f32>,
    mask: Option<ArrayView2<'_, bool>>,
    options: &ImageOptions,
) -> Result<ImageBatch> {
    if let Some(mask) = &mask {
        if mask.dim() != tensor.dim() {
            return Err(Error::ShapeMismatch {
                expected: format!("mask of shape {:?}", tensor.shape()),
                actual: format!("{:?}", mask.shape()),
            });
        }
    }
    options.validate()?;
    let ramp = registry.lookup(&options.cmap).ok_or_else(|| {
        Error::invalid_parameter("cmap", format!("unknown colormap {:?}", options.cmap))
    })?;
    let (min, max) = resolve_range(tensor, mask, options)?;

    let _span = tracing::debug_span!(
        "colorize",
        scope = options.label.as_deref().unwrap_or("create_image")
    )
    .entered();
    tracing::debug!(
        "coloring {:?} tensor over [{min}, {max}] with {} ({} cycles)",
        tensor.shape(),
        options.cmap,
        options.cycle_color_map
    );

    let colored = colorize(tensor, mask, &ramp, (min, max), options.cycle_color_map);
    let expanded = expand_height(colored.into_dyn().view(), options.expand_height, None)?;

    expanded
        .insert_axis(ndarray::Axis(0))
        .into_dimensionality::<Ix4>()
        .map_err(|err| Error::ShapeMismatch {
            expected: "rank 4 image batch".to_string(),
            actual: err.to_string(),
        })
}

/// Value range used for color mapping.
fn resolve_range(
    tensor: ArrayView2<'_, f32>,
    mask: Option<ArrayView2<'_, bool>>,
    options: &ImageOptions,
) -> Result<(f32, f32)> {
    let (observed_min, observed_max) = if options.minval.is_none() || options.maxval.is_none() {
        observed_range(tensor, mask)
    } else {
        (0.0, 1.0)
    };
    let min = options.minval.unwrap_or(observed_min);
    let max = options.maxval.unwrap_or(observed_max);
    if min > max {
        return Err(Error::invalid_parameter(
            "minval",
            format!("resolved value range [{min}, {max}] is inverted"),
        ));
    }
    Ok((min, max))
}

/// Minimum and maximum of the unmasked finite values, `(0, 1)` if none remain.
fn observed_range(tensor: ArrayView2<'_, f32>, mask: Option<ArrayView2<'_, bool>>) -> (f32, f32) {
    let (min, max) = tensor
        .indexed_iter()
        .filter(|(index, v)| v.is_finite() && !mask.is_some_and(|m| m[*index]))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (_, &v)| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}

/// Map a normalised value onto `cycles` repetitions of the colormap.
///
/// Band boundaries map to the top of the colormap, so a single cycle is the
/// identity and every band ends on the highest color.
#[allow(clippy::cast_precision_loss)]
fn cycle(t: f32, cycles: i64) -> f32 {
    if cycles <= 1 {
        return t;
    }
    let scaled = t * cycles as f32;
    let wrapped = scaled.fract();
    if wrapped == 0.0 && scaled > 0.0 {
        1.0
    } else {
        wrapped
    }
}

#[allow(clippy::cast_possible_truncation)]
fn colorize(
    tensor: ArrayView2<'_, f32>,
    mask: Option<ArrayView2<'_, bool>>,
    ramp: &ColorRamp,
    (min, max): (f32, f32),
    cycles: i64,
) -> Array3<u8> {
    let span = f64::from(max) - f64::from(min);
    let (height, width) = tensor.dim();
    let mut image = Array3::<u8>::zeros((height, width, 3));

    for ((y, x), &value) in tensor.indexed_iter() {
        let masked = mask.is_some_and(|m| m[[y, x]]);
        let color = if masked || !value.is_finite() {
            MASKED_COLOR
        } else {
            let t = if span > 0.0 {
                ((f64::from(value.clamp(min, max)) - f64::from(min)) / span) as f32
            } else {
                0.0
            };
            ramp.sample(cycle(t, cycles))
        };
        for c in 0..3 {
            image[[y, x, c]] = color[c];
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::Array2;
    use rand::{Rng, SeedableRng};

    fn random_tensor(shape: (usize, usize), seed: u64) -> Array2<f32> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Array2::from_shape_fn(shape, |_| rng.random_range(-5.0..5.0_f32))
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(image: &ImageBatch) -> f32 {
        image.iter().map(|&v| f32::from(v)).sum::<f32>() / image.len() as f32
    }

    #[test]
    fn test_inverted_range() {
        let tensor = random_tensor((4, 6), 1);
        let options = ImageOptions {
            minval: Some(2.0),
            maxval: Some(-2.0),
            ..ImageOptions::default()
        };
        let err = create_image(tensor.view(), None, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        let options = ImageOptions {
            minval: Some(1.0),
            maxval: Some(1.0),
            ..ImageOptions::default()
        };
        let err = create_image(tensor.view(), None, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_pixel_range_and_mean() {
        let tensor = random_tensor((16, 32), 2);
        let options = ImageOptions {
            minval: Some(-3.0),
            maxval: Some(3.0),
            ..ImageOptions::default()
        };
        let image = create_image(tensor.view(), None, &options).unwrap();
        assert_eq!(image.shape(), &[1, 16, 32, 3]);
        assert!(mean(&image) > 10.0);
    }

    #[test]
    fn test_expand_height() {
        let tensor = random_tensor((5, 7), 3);
        let options = ImageOptions {
            expand_height: 8,
            ..ImageOptions::default()
        };
        let image = create_image(tensor.view(), None, &options).unwrap();
        assert_eq!(image.shape(), &[1, 40, 7, 3]);
        assert_eq!(image.slice(ndarray::s![0, 0, .., ..]), image.slice(ndarray::s![0, 7, .., ..]));
    }

    #[test]
    fn test_invalid_integers() {
        let tensor = random_tensor((2, 2), 4);
        for options in [
            ImageOptions {
                expand_height: 0,
                ..ImageOptions::default()
            },
            ImageOptions {
                cycle_color_map: -2,
                ..ImageOptions::default()
            },
        ] {
            let err = create_image(tensor.view(), None, &options).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
        }
    }

    #[test]
    fn test_unknown_colormap() {
        let tensor = random_tensor((2, 2), 5);
        let options = ImageOptions {
            cmap: "rainbow_unicorn".to_string(),
            ..ImageOptions::default()
        };
        let err = create_image(tensor.view(), None, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_mask() {
        let tensor = random_tensor((3, 3), 6);
        let mut mask = Array2::from_elem((3, 3), false);
        mask[[1, 2]] = true;

        let image = create_image(tensor.view(), Some(mask.view()), &ImageOptions::default()).unwrap();
        for c in 0..3 {
            assert_eq!(image[[0, 1, 2, c]], MASKED_COLOR[c]);
        }

        let wrong = Array2::from_elem((3, 4), false);
        let err = create_image(tensor.view(), Some(wrong.view()), &ImageOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_masked_values_do_not_widen_range() {
        let tensor = ndarray::arr2(&[[0.0_f32, 1.0, 1000.0]]);
        let mask = ndarray::arr2(&[[false, false, true]]);
        assert_eq!(observed_range(tensor.view(), Some(mask.view())), (0.0, 1.0));
        assert_eq!(observed_range(tensor.view(), None), (0.0, 1000.0));
    }

    #[test]
    fn test_extremes_hit_ramp_ends() {
        let tensor = ndarray::arr2(&[[-1.0_f32, 0.0, 1.0, 7.0]]);
        let options = ImageOptions {
            minval: Some(0.0),
            maxval: Some(1.0),
            cmap: "gray".to_string(),
            ..ImageOptions::default()
        };
        let image = create_image(tensor.view(), None, &options).unwrap();
        let red: Vec<u8> = image.slice(ndarray::s![0, 0, .., 0]).to_vec();
        assert_eq!(red, [0, 0, 255, 255]);
    }

    fn gray_red_channel(tensor: &Array2<f32>, minval: Option<f32>, maxval: Option<f32>) -> Result<Vec<u8>> {
        let options = ImageOptions {
            minval,
            maxval,
            cmap: "gray".to_string(),
            ..ImageOptions::default()
        };
        let image = create_image(tensor.view(), None, &options)?;
        Ok(image.slice(ndarray::s![0, 0, .., 0]).to_vec())
    }

    #[test]
    fn test_distant_bounds_keep_full_scale() {
        let tensor = ndarray::arr2(&[[-3e38_f32, 0.0, 3e38]]);
        assert_eq!(gray_red_channel(&tensor, None, None).unwrap(), [0, 128, 255]);
        assert_eq!(
            gray_red_channel(&tensor, Some(-3e38), Some(3e38)).unwrap(),
            [0, 128, 255]
        );
    }

    #[test]
    fn test_minval_only() {
        let tensor = ndarray::arr2(&[[0.0_f32, 1.0, 2.0]]);
        assert_eq!(gray_red_channel(&tensor, Some(1.0), None).unwrap(), [0, 0, 255]);

        // above the largest value, the data max cannot close the range
        let err = gray_red_channel(&tensor, Some(5.0), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_maxval_only() {
        let tensor = ndarray::arr2(&[[0.0_f32, 1.0, 2.0]]);
        assert_eq!(gray_red_channel(&tensor, None, Some(1.0)).unwrap(), [0, 255, 255]);

        let err = gray_red_channel(&tensor, None, Some(-1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_constant_tensor_uses_lowest_color() {
        let tensor = Array2::from_elem((2, 2), 3.0_f32);
        let image = create_image(tensor.view(), None, &ImageOptions::default()).unwrap();
        let lowest = BuiltinColormaps.lookup("viridis").unwrap().first();
        assert!(image.slice(ndarray::s![0, .., .., 0]).iter().all(|&v| v == lowest[0]));
    }

    #[test]
    fn test_cycle() {
        assert!((cycle(0.3, 1) - 0.3).abs() < f32::EPSILON);
        assert!((cycle(0.25, 2) - 0.5).abs() < f32::EPSILON);
        assert!((cycle(0.75, 2) - 0.5).abs() < f32::EPSILON);
        assert!((cycle(0.5, 2) - 1.0).abs() < f32::EPSILON);
        assert!((cycle(1.0, 3) - 1.0).abs() < f32::EPSILON);
        assert!(cycle(0.0, 4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cycled_image_repeats_colors() {
        let tensor = ndarray::arr2(&[[0.25_f32, 0.75]]);
        let options = ImageOptions {
            minval: Some(0.0),
            maxval: Some(1.0),
            cycle_color_map: 2,
            ..ImageOptions::default()
        };
        let image = create_image(tensor.view(), None, &options).unwrap();
        assert_eq!(image.slice(ndarray::s![0, 0, 0, ..]), image.slice(ndarray::s![0, 0, 1, ..]));
    }
}
