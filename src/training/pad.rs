//! Tensor padding with constant, mirrored and wrapped borders.

use std::str::FromStr;

use ndarray::{Array4, ArrayD, ArrayView4, ArrayViewD, Ix4, IxDyn};

use crate::error::{Error, Result};

use super::padding::{compute_padding, Dims2};

/// How the border of a padded tensor is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Fill with a constant value.
    Constant,
    /// Mirror without repeating the edge element: `[1, 2, 3]` -> `3 2 | 1 2 3 | 2 1`.
    Reflect,
    /// Mirror including the edge element: `[1, 2, 3]` -> `2 1 | 1 2 3 | 3 2`.
    Symmetric,
    /// Wrap around: `[1, 2, 3]` -> `2 3 | 1 2 3 | 1 2`.
    Cyclic,
}

impl PadMode {
    /// Largest padding allowed on one side of an axis of length `dim`.
    const fn max_padding(self, dim: usize) -> Option<usize> {
        match self {
            Self::Constant => None,
            Self::Reflect => Some(dim.saturating_sub(1)),
            Self::Symmetric | Self::Cyclic => Some(dim),
        }
    }

    /// Source index for output position `pos` (already shifted by the leading
    /// padding). `None` means the position takes the constant value.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn source(self, pos: isize, dim: usize) -> Option<usize> {
        let n = dim as isize;
        if (0..n).contains(&pos) {
            return Some(pos as usize);
        }
        let mapped = match self {
            Self::Constant => return None,
            Self::Reflect if pos < 0 => -pos,
            Self::Reflect => 2 * (n - 1) - pos,
            Self::Symmetric if pos < 0 => -pos - 1,
            Self::Symmetric => 2 * n - 1 - pos,
            Self::Cyclic => pos.rem_euclid(n),
        };
        Some(mapped as usize)
    }
}

impl FromStr for PadMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CONSTANT" => Ok(Self::Constant),
            "REFLECT" => Ok(Self::Reflect),
            "SYMMETRIC" => Ok(Self::Symmetric),
            "CYCLIC" => Ok(Self::Cyclic),
            _ => Err(Error::invalid_parameter(
                "mode",
                format!("expected one of CONSTANT, REFLECT, SYMMETRIC, CYCLIC, got {s:?}"),
            )),
        }
    }
}

/// Pad a tensor of any rank, filling constant borders with `A::default()`.
///
/// # Errors
///
/// See [`pad_with`].
pub fn pad<A: Clone + Default>(
    tensor: ArrayViewD<'_, A>,
    paddings: &[(usize, usize)],
    mode: PadMode,
) -> Result<ArrayD<A>> {
    pad_with(tensor, paddings, mode, A::default())
}

/// Pad a tensor of any rank.
///
/// `paddings[i]` holds the amount added before and after axis `i`, so the
/// output has extent `dim + before + after` on every axis.
///
/// # Errors
///
/// Returns an error if the number of padding pairs differs from the tensor
/// rank, or if a padding exceeds what the mode can mirror or wrap
/// (`dim - 1` for reflect, `dim` for symmetric and cyclic).
#[allow(clippy::cast_possible_wrap)]
pub fn pad_with<A: Clone>(
    tensor: ArrayViewD<'_, A>,
    paddings: &[(usize, usize)],
    mode: PadMode,
    constant: A,
) -> Result<ArrayD<A>> {
    if paddings.len() != tensor.ndim() {
        return Err(Error::ShapeMismatch {
            expected: format!("{} padding pairs", tensor.ndim()),
            actual: format!("{} padding pairs", paddings.len()),
        });
    }
    for (axis, (&dim, &(before, after))) in tensor.shape().iter().zip(paddings).enumerate() {
        if let Some(max) = mode.max_padding(dim) {
            if before > max || after > max {
                return Err(Error::invalid_parameter(
                    "paddings",
                    format!(
                        "{mode:?} padding of axis {axis} with extent {dim} cannot exceed {max}, got ({before}, {after})"
                    ),
                ));
            }
        }
    }

    let _span = tracing::trace_span!("pad", ?mode).entered();

    let out_shape: Vec<usize> = tensor
        .shape()
        .iter()
        .zip(paddings)
        .map(|(&dim, &(before, after))| dim + before + after)
        .collect();
    tracing::trace!("padding {:?} to {out_shape:?}", tensor.shape());

    let dims = tensor.shape().to_vec();
    let mut source = vec![0usize; dims.len()];
    let padded = ArrayD::from_shape_fn(IxDyn(&out_shape), |index| {
        for axis in 0..dims.len() {
            let pos = index[axis] as isize - paddings[axis].0 as isize;
            match mode.source(pos, dims[axis]) {
                Some(src) => source[axis] = src,
                None => return constant.clone(),
            }
        }
        tensor[IxDyn(&source)].clone()
    });
    Ok(padded)
}

/// Pad the spatial axes of an `[N, H, W, C]` tensor for a `same` convolution.
///
/// # Errors
///
/// Returns an error if the kernel or strides are out of range for the
/// spatial dimensions, or if the mode cannot produce the required padding.
#[allow(clippy::cast_possible_wrap)]
pub fn pad_same<A: Clone + Default>(
    tensor: ArrayView4<'_, A>,
    kernel_size: Dims2,
    strides: Dims2,
    mode: PadMode,
    scope: Option<&str>,
) -> Result<Array4<A>> {
    let (_, height, width, _) = tensor.dim();
    let spatial = Dims2::new(height as i64, width as i64);
    let quad = compute_padding(spatial, kernel_size, strides, scope)?;
    let [vertical, horizontal] = quad.pairs();

    let padded = pad(tensor.into_dyn(), &[(0, 0), vertical, horizontal, (0, 0)], mode)?;
    padded
        .into_dimensionality::<Ix4>()
        .map_err(|err| Error::ShapeMismatch {
            expected: "rank 4 tensor".to_string(),
            actual: err.to_string(),
        })
}
