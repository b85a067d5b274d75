//! Vertical magnification of image-like tensors.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use crate::error::{Error, Result};

/// Enlarge an image-like tensor `[H, W, C]` along its height.
///
/// Each row is repeated `factor` times in place, so row `i` of the input
/// becomes rows `i * factor .. (i + 1) * factor` of the output. The result has
/// shape `[H * factor, W, C]` and the element type of the input.
///
/// # Errors
///
/// Returns [`Error::NotSupported`] for batched (rank 4) tensors, and a range
/// error for any other rank than 3 or a `factor` smaller than 1.
pub fn expand_height<A: Clone>(
    tensor: ArrayViewD<'_, A>,
    factor: i64,
    scope: Option<&str>,
) -> Result<ArrayD<A>> {
    match tensor.ndim() {
        3 => {}
        4 => {
            return Err(Error::NotSupported {
                operation: "expand_height".to_string(),
                reason: "batched tensors".to_string(),
            })
        }
        rank => {
            return Err(Error::ShapeMismatch {
                expected: "rank 3 tensor [H, W, C]".to_string(),
                actual: format!("rank {rank} tensor"),
            })
        }
    }
    let factor = usize::try_from(factor)
        .ok()
        .filter(|&f| f >= 1)
        .ok_or_else(|| {
            Error::invalid_parameter(
                "factor",
                format!("expected integer greater or equal to 1, got {factor}"),
            )
        })?;

    let _span = tracing::debug_span!("expand", scope = scope.unwrap_or("expand_height")).entered();

    let (height, width, channels) = (tensor.shape()[0], tensor.shape()[1], tensor.shape()[2]);
    let tiled_shape = IxDyn(&[height, factor, width, channels]);
    let tiled = tensor
        .insert_axis(Axis(1))
        .broadcast(tiled_shape)
        .ok_or_else(|| Error::ShapeMismatch {
            expected: format!("[{height}, {factor}, {width}, {channels}]"),
            actual: "broadcast failed".to_string(),
        })?
        .as_standard_layout()
        .into_owned();

    tracing::trace!("expanding height {height} by {factor}");

    tiled
        .into_shape_with_order(IxDyn(&[height * factor, width, channels]))
        .map_err(|err| Error::ShapeMismatch {
            expected: format!("[{}, {width}, {channels}]", height * factor),
            actual: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::{Array, Array3};
    use rand::{Rng, SeedableRng};

    fn ones(shape: &[usize]) -> ArrayD<f32> {
        Array::ones(IxDyn(shape))
    }

    #[test]
    fn test_exceptions() {
        let err = expand_height(ones(&[1; 4]).view(), 3, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);

        for (shape, factor) in [(&[1_usize; 2][..], 1), (&[1; 5][..], 8)] {
            let err = expand_height(ones(shape).view(), factor, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
        }
        for factor in [0, -1] {
            let err = expand_height(ones(&[1; 3]).view(), factor, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
        }
    }

    #[test]
    fn test_shape() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let f = rng.random_range(1..=10);
            let (h, w, c) = (
                rng.random_range(1..=40),
                rng.random_range(1..=100),
                rng.random_range(1..=10),
            );
            let expanded = expand_height(ones(&[h, w, c]).view(), f, Some("test")).unwrap();
            assert_eq!(expanded.shape(), &[h * usize::try_from(f).unwrap(), w, c]);
        }
    }

    #[test]
    fn test_rows_repeat_contiguously() {
        let image = Array3::from_shape_fn((3, 2, 1), |(y, x, _)| (y * 10 + x) as u8).into_dyn();
        let expanded = expand_height(image.view(), 2, None).unwrap();

        for row in 0..6 {
            for col in 0..2 {
                assert_eq!(expanded[[row, col, 0]], image[[row / 2, col, 0]]);
            }
        }
    }

    #[test]
    fn test_factor_one_is_identity() {
        let image = Array3::from_shape_fn((4, 3, 2), |(y, x, c)| (y + x * c) as f32).into_dyn();
        let expanded = expand_height(image.view(), 1, None).unwrap();
        assert_eq!(expanded, image);
    }
}
