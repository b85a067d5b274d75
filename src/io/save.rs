//! Image saving utilities.

use std::path::Path;

use image::DynamicImage;

use crate::error::{Error, Result};
use crate::visu::{batch_to_rgb, ImageBatch};

/// Save the first image of a batch as an image file.
///
/// The format is inferred from the extension: `jpg`/`jpeg` are written with
/// the given JPEG quality, everything else as PNG.
///
/// # Arguments
///
/// * `batch` - NHWC batch `[N, H, W, 3]`
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the batch is not an RGB batch or the image cannot be saved.
pub fn save_image<P: AsRef<Path>>(batch: &ImageBatch, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    if !(1..=100).contains(&quality) {
        return Err(Error::invalid_parameter("quality", "must be between 1 and 100"));
    }

    let img = DynamicImage::ImageRgb8(batch_to_rgb(batch)?);

    // Determine format and save
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    tracing::debug!("saving {}x{} image to {}", img.width(), img.height(), path.display());

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            img.save_with_format(path, image::ImageFormat::Png)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_save_png_and_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let batch = Array4::<u8>::from_elem((1, 4, 6, 3), 200);

        for name in ["out.png", "out.jpg", "no_extension"] {
            let path = dir.path().join(name);
            save_image(&batch, &path, 90).unwrap();
            let loaded = image::ImageReader::open(&path)
                .unwrap()
                .with_guessed_format()
                .unwrap()
                .decode()
                .unwrap();
            assert_eq!((loaded.width(), loaded.height()), (6, 4));
        }
    }

    #[test]
    fn test_invalid_quality() {
        let dir = tempfile::tempdir().unwrap();
        let batch = Array4::<u8>::zeros((1, 2, 2, 3));
        assert!(save_image(&batch, dir.path().join("x.jpg"), 0).is_err());
    }
}
