//! "Same"-padding sizes for 2D convolutions.

use crate::error::{Error, Result};

/// A pair of spatial extents (height, width).
///
/// Signed so that zero and negative values reach the range checks instead of
/// being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims2 {
    pub height: i64,
    pub width: i64,
}

impl Dims2 {
    /// Pair of extents from height and width.
    #[must_use]
    pub const fn new(height: i64, width: i64) -> Self {
        Self { height, width }
    }

    const fn axes(self) -> [i64; 2] {
        [self.height, self.width]
    }
}

/// Builds from a `(height, width)` tuple.
impl From<(i64, i64)> for Dims2 {
    fn from((height, width): (i64, i64)) -> Self {
        Self { height, width }
    }
}

impl TryFrom<&[i64]> for Dims2 {
    type Error = Error;

    fn try_from(values: &[i64]) -> Result<Self> {
        match values {
            [height, width] => Ok(Self::new(*height, *width)),
            _ => Err(Error::invalid_type(
                "dims",
                format!("expected a pair of integers, got {} values", values.len()),
            )),
        }
    }
}

/// Padding on the four sides of an image.
///
/// The total per axis is split floor-biased: `top <= bottom`, `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaddingQuad {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl PaddingQuad {
    /// Total padding along the height axis.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.top + self.bottom
    }

    /// Total padding along the width axis.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.left + self.right
    }

    /// `[(top, bottom), (left, right)]`, the layout `pad` expects per axis.
    #[must_use]
    pub const fn pairs(&self) -> [(usize, usize); 2] {
        [(self.top, self.bottom), (self.left, self.right)]
    }
}

/// Compute the padding of a `[N, H, W, C]` tensor for a 2D convolution with
/// `same` padding, matching the TensorFlow convention.
///
/// # Arguments
///
/// * `spatial_dims` - Spatial dimensions H and W of the input
/// * `kernel_size` - Kernel size of the convolution
/// * `strides` - Strides of the convolution
/// * `scope` - Optional diagnostic label for the tracing span
///
/// # Errors
///
/// Returns an error if a stride or kernel component is smaller than 1 or
/// greater than the corresponding spatial dimension.
pub fn compute_padding(
    spatial_dims: Dims2,
    kernel_size: Dims2,
    strides: Dims2,
    scope: Option<&str>,
) -> Result<PaddingQuad> {
    let dims = spatial_dims.axes();

    for (stride, dim) in strides.axes().into_iter().zip(dims) {
        if !(1..=dim).contains(&stride) {
            return Err(Error::invalid_parameter(
                "strides",
                format!(
                    "cannot be smaller than 1 or greater than the spatial dimension, got {strides:?} for {spatial_dims:?}"
                ),
            ));
        }
    }
    for (kernel, dim) in kernel_size.axes().into_iter().zip(dims) {
        if !(1..=dim).contains(&kernel) {
            return Err(Error::invalid_parameter(
                "kernel_size",
                format!(
                    "cannot be smaller than 1 or greater than the spatial dimension, got {kernel_size:?} for {spatial_dims:?}"
                ),
            ));
        }
    }

    let _span =
        tracing::debug_span!("padding", scope = scope.unwrap_or("calculate_padding_sizes")).entered();

    let (top, bottom) = split_axis(spatial_dims.height, kernel_size.height, strides.height);
    let (left, right) = split_axis(spatial_dims.width, kernel_size.width, strides.width);
    let quad = PaddingQuad {
        top,
        bottom,
        left,
        right,
    };

    tracing::debug!("same padding for {spatial_dims:?}, kernel {kernel_size:?}, strides {strides:?}: {quad:?}");
    Ok(quad)
}

/// Total padding of one axis split into (low, high). Inputs are validated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn split_axis(dim: i64, kernel: i64, stride: i64) -> (usize, usize) {
    // ceil(dim / stride) without forming dim + stride
    let out = (dim - 1) / stride + 1;
    // (out - 1) * stride <= dim - 1, so no step overflows
    let total = ((out - 1) * stride - dim + kernel).max(0) as usize;
    let low = total / 2;
    (low, total - low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn padding(dims: (i64, i64), kernel: (i64, i64), strides: (i64, i64)) -> Result<PaddingQuad> {
        compute_padding(dims.into(), kernel.into(), strides.into(), None)
    }

    #[test]
    fn test_same_padding_3x3() {
        let quad = padding((10, 10), (3, 3), (1, 1)).unwrap();
        assert_eq!(
            quad,
            PaddingQuad {
                top: 1,
                bottom: 1,
                left: 1,
                right: 1
            }
        );
    }

    #[test]
    fn test_remainder_goes_to_bottom_right() {
        // height: 4*2 + 4 - 10 = 2, width: 8*1 + 2 - 9 = 1
        let quad = padding((10, 9), (4, 2), (2, 1)).unwrap();
        assert_eq!(quad.height(), 2);
        assert_eq!((quad.top, quad.bottom), (1, 1));
        assert_eq!((quad.left, quad.right), (0, 1));
    }

    #[test]
    fn test_large_stride_needs_no_padding() {
        let quad = padding((10, 10), (2, 2), (5, 5)).unwrap();
        assert_eq!(quad, PaddingQuad::default());
    }

    #[test]
    fn test_exhaustive_invariants() {
        for dim in 1..=12 {
            for kernel in 1..=dim {
                for stride in 1..=dim {
                    let quad = padding((dim, dim), (kernel, kernel), (stride, stride)).unwrap();
                    let out = (dim + stride - 1) / stride;
                    let expected = ((out - 1) * stride + kernel - dim).max(0);
                    assert_eq!(i64::try_from(quad.height()).unwrap(), expected);
                    assert_eq!(quad.height(), quad.width());
                    assert!(quad.top <= quad.bottom);
                    assert!(quad.bottom - quad.top <= 1);
                    assert_eq!(quad.top, quad.height() / 2);
                }
            }
        }
    }

    #[test]
    fn test_extreme_dims_do_not_overflow() {
        let quad = compute_padding(Dims2::new(i64::MAX, 4), Dims2::new(3, 3), Dims2::new(2, 1), None).unwrap();
        assert_eq!(quad, PaddingQuad { top: 1, bottom: 1, left: 1, right: 1 });

        let quad = compute_padding(
            Dims2::new(i64::MAX, i64::MAX),
            Dims2::new(i64::MAX, 1),
            Dims2::new(1, i64::MAX),
            None,
        )
        .unwrap();
        assert_eq!(quad.height(), usize::try_from(i64::MAX - 1).unwrap());
        assert_eq!(quad.width(), 0);
    }

    #[test]
    fn test_range_errors() {
        let cases = [
            ((10, 10), (3, 3), (0, 2)),
            ((10, 10), (3, 3), (1, 12)),
            ((10, 10), (12, 3), (2, 2)),
            ((10, 10), (0, 3), (1, 1)),
            ((10, 10), (3, -1), (1, 1)),
        ];
        for (dims, kernel, strides) in cases {
            let err = padding(dims, kernel, strides).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range, "{dims:?} {kernel:?} {strides:?}");
        }
    }

    #[test]
    fn test_dims_from_slice() {
        assert_eq!(Dims2::try_from(&[4_i64, 8][..]).unwrap(), Dims2::new(4, 8));
        let err = Dims2::try_from(&[10_i64][..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_pairs() {
        let quad = PaddingQuad {
            top: 0,
            bottom: 1,
            left: 2,
            right: 3,
        };
        assert_eq!(quad.pairs(), [(0, 1), (2, 3)]);
        assert_eq!(quad.width(), 5);
    }
}
