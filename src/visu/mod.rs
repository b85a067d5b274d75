//! Images for monitoring training: confusion matrices and colored tensors.

mod colorful;
mod colormap;
mod confusion;
mod expand;
mod raster;

pub use colorful::{create_image, create_image_with, ImageOptions, MASKED_COLOR};
pub use colormap::{BuiltinColormaps, ColorRamp, ColormapRegistry, LUT_SIZE};
pub use confusion::{
    confusion_matrix_image, confusion_matrix_image_with, layout as confusion_matrix_layout,
    ConfusionMatrixConfig,
};
pub use expand::expand_height;
pub use raster::{
    figure_side, Align, Canvas, DrawCommand, FigRect, Orientation, RasterBackend, MAX_SIDE_PX,
};

use image::RgbImage;
use ndarray::Array4;

use crate::error::{Error, Result};

/// RGB image batch in NHWC format (batch, height, width, channels) with a
/// batch size of one.
pub type ImageBatch = Array4<u8>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Convert an RGB image into a batch of one `[1, H, W, 3]`.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match the image dimensions.
pub fn rgb_to_batch(image: &RgbImage) -> Result<ImageBatch> {
    let (width, height) = image.dimensions();
    let shape = (1, height as usize, width as usize, RGB_CHANNELS);
    Array4::from_shape_vec(shape, image.as_raw().clone()).map_err(|_| Error::ShapeMismatch {
        expected: format!("{shape:?}"),
        actual: format!("{} bytes", image.as_raw().len()),
    })
}

/// Convert the first image of a batch `[N, H, W, 3]` back into an RGB image.
///
/// # Errors
///
/// Returns an error if the batch is empty, does not have three channels, or
/// is too large for an image buffer.
pub fn batch_to_rgb(batch: &ImageBatch) -> Result<RgbImage> {
    let (n, height, width, channels) = batch.dim();
    if n == 0 || channels != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: "[N >= 1, H, W, 3]".to_string(),
            actual: format!("{:?}", batch.shape()),
        });
    }
    let too_large = |_| Error::invalid_parameter("batch", "image dimensions exceed u32");
    let width = u32::try_from(width).map_err(too_large)?;
    let height = u32::try_from(height).map_err(too_large)?;
    let pixels: Vec<u8> = batch.index_axis(ndarray::Axis(0), 0).iter().copied().collect();

    RgbImage::from_raw(width, height, pixels).ok_or_else(|| Error::ShapeMismatch {
        expected: format!("{width}x{height} RGB buffer"),
        actual: "buffer too small".to_string(),
    })
}
