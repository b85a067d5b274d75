//! Confusion matrix heat-map images for training summaries.

use image::{Rgb, RgbImage};
use ndarray::ArrayView2;

use crate::error::{Error, Result};

use super::colormap::{BuiltinColormaps, ColorRamp, ColormapRegistry};
use super::raster::{figure_side, Align, Canvas, DrawCommand, FigRect, Orientation, RasterBackend};
use super::{rgb_to_batch, ImageBatch};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([160, 160, 160]);

/// Figure margins, as fractions of the figure side.
const MARGIN_LEFT: f32 = 0.24;
const MARGIN_BOTTOM: f32 = 0.24;
const MARGIN_TOP: f32 = 0.04;
const MARGIN_RIGHT: f32 = 0.04;

/// Options for [`confusion_matrix_image`].
#[derive(Debug, Clone)]
pub struct ConfusionMatrixConfig {
    /// Resolution of the figure in dots per inch.
    pub dpi: u32,

    /// Side length of the square figure in inches.
    pub size_inches: f32,

    /// Name of the colormap used for the cells.
    pub cmap: String,

    /// Whether every cell is annotated with its value.
    pub annotate: bool,

    /// Diagnostic label for the tracing span.
    pub label: Option<String>,
}

impl Default for ConfusionMatrixConfig {
    fn default() -> Self {
        Self {
            dpi: 100,
            size_inches: 6.0,
            cmap: "Blues".to_string(),
            annotate: true,
            label: None,
        }
    }
}

impl ConfusionMatrixConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the figure would not have a renderable pixel size.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(Error::invalid_parameter("dpi", "must be greater than 0"));
        }
        if !(self.size_inches.is_finite() && self.size_inches > 0.0) {
            return Err(Error::invalid_parameter(
                "size_inches",
                "must be a positive finite number",
            ));
        }
        figure_side(self.dpi, self.size_inches).map(|_| ())
    }
}

/// Render a confusion matrix with the built-in colormaps and canvas.
///
/// # Errors
///
/// See [`confusion_matrix_image_with`].
pub fn confusion_matrix_image<S: AsRef<str>>(
    matrix: ArrayView2<'_, f32>,
    class_names: &[S],
    config: &ConfusionMatrixConfig,
) -> Result<ImageBatch> {
    confusion_matrix_image_with(&BuiltinColormaps, &Canvas::default(), matrix, class_names, config)
}

/// Render a confusion matrix as an RGB image batch of shape `[1, S, S, 3]`,
/// where `S = dpi * size_inches`.
///
/// Cells are colored by their value scaled between the matrix minimum and
/// maximum, annotated with the value, and labeled with `class_names` on both
/// axes. The rendered image is stretched so its darkest channel value is 0
/// and its brightest 255.
///
/// # Errors
///
/// Returns an error if `class_names` is empty or its length differs from the
/// matrix size, if the matrix is not square, if the colormap is unknown, or if
/// the configuration is invalid.
pub fn confusion_matrix_image_with<S: AsRef<str>>(
    registry: &impl ColormapRegistry,
    backend: &impl RasterBackend,
    matrix: ArrayView2<'_, f32>,
    class_names: &[S],
    config: &ConfusionMatrixConfig,
) -> Result<ImageBatch> {
    let (rows, cols) = matrix.dim();
    if class_names.is_empty() {
        return Err(Error::invalid_parameter("class_names", "must not be empty"));
    }
    if class_names.len() != rows {
        return Err(Error::ShapeMismatch {
            expected: format!("{rows} class names"),
            actual: format!("{} class names", class_names.len()),
        });
    }
    if rows != cols {
        return Err(Error::ShapeMismatch {
            expected: format!("square matrix [{rows}, {rows}]"),
            actual: format!("[{rows}, {cols}]"),
        });
    }
    config.validate()?;
    let ramp = registry.lookup(&config.cmap).ok_or_else(|| {
        Error::invalid_parameter("cmap", format!("unknown colormap {:?}", config.cmap))
    })?;

    let _span = tracing::debug_span!(
        "confusion",
        scope = config.label.as_deref().unwrap_or("confusion_matrix")
    )
    .entered();

    let names: Vec<&str> = class_names.iter().map(|name| name.as_ref()).collect();
    let commands = layout(matrix, &names, &ramp, config.annotate);
    tracing::debug!(
        "rendering {rows}x{rows} confusion matrix with {} draw commands at {} dpi",
        commands.len(),
        config.dpi
    );

    let mut image = backend.render(&commands, config.dpi, config.size_inches)?;
    stretch_contrast(&mut image);
    rgb_to_batch(&image)
}

/// Build the draw commands of a confusion matrix figure.
///
/// Inputs are assumed validated: `matrix` is square with one name per row.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn layout(
    matrix: ArrayView2<'_, f32>,
    class_names: &[&str],
    ramp: &ColorRamp,
    annotate: bool,
) -> Vec<DrawCommand> {
    let n = matrix.nrows();
    let (min, max) = value_range(matrix);
    // f64 so that distant finite bounds do not overflow the span
    let span = f64::from(max) - f64::from(min);
    let normalise = |v: f32| {
        if span > 0.0 {
            ((f64::from(v) - f64::from(min)) / span) as f32
        } else {
            0.0
        }
    };
    let integral = matrix.iter().all(|v| v.fract() == 0.0);

    let grid_w = 1.0 - MARGIN_LEFT - MARGIN_RIGHT;
    let grid_h = 1.0 - MARGIN_TOP - MARGIN_BOTTOM;
    let (cell_w, cell_h) = (grid_w / n as f32, grid_h / n as f32);
    let label_size = (cell_h * 0.5).min(0.04);

    let mut commands = Vec::with_capacity(n * n * 2 + 4 * n + 8);

    for ((row, col), &value) in matrix.indexed_iter() {
        let t = normalise(value);
        let x = MARGIN_LEFT + col as f32 * cell_w;
        let y = MARGIN_TOP + row as f32 * cell_h;
        commands.push(DrawCommand::Fill {
            rect: FigRect {
                x,
                y,
                width: cell_w,
                height: cell_h,
            },
            color: ramp.sample(t),
        });
        if annotate {
            commands.push(DrawCommand::Text {
                text: format_value(value, integral),
                anchor: (x + cell_w / 2.0, y + cell_h / 2.0),
                size: cell_h * 0.35,
                max_extent: cell_w * 0.9,
                align: Align::Center,
                orientation: Orientation::Horizontal,
                color: if t > 0.5 { WHITE } else { BLACK },
            });
        }
    }

    // Gridlines between cells, then the frame on top.
    for i in 1..n {
        let x = MARGIN_LEFT + i as f32 * cell_w;
        let y = MARGIN_TOP + i as f32 * cell_h;
        commands.push(DrawCommand::Line {
            from: (x, MARGIN_TOP),
            to: (x, MARGIN_TOP + grid_h),
            color: GRID,
        });
        commands.push(DrawCommand::Line {
            from: (MARGIN_LEFT, y),
            to: (MARGIN_LEFT + grid_w, y),
            color: GRID,
        });
    }
    let (left, top, right, bottom) = (MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT + grid_w, MARGIN_TOP + grid_h);
    for (from, to) in [
        ((left, top), (right, top)),
        ((right, top), (right, bottom)),
        ((right, bottom), (left, bottom)),
        ((left, bottom), (left, top)),
    ] {
        commands.push(DrawCommand::Line { from, to, color: BLACK });
    }

    // Tick labels: rows on the left, columns below reading downwards.
    for (i, name) in class_names.iter().enumerate() {
        commands.push(DrawCommand::Text {
            text: (*name).to_string(),
            anchor: (MARGIN_LEFT - 0.01, MARGIN_TOP + (i as f32 + 0.5) * cell_h),
            size: label_size,
            max_extent: MARGIN_LEFT - 0.07,
            align: Align::End,
            orientation: Orientation::Horizontal,
            color: BLACK,
        });
        commands.push(DrawCommand::Text {
            text: (*name).to_string(),
            anchor: (MARGIN_LEFT + (i as f32 + 0.5) * cell_w, bottom + 0.01),
            size: label_size,
            max_extent: MARGIN_BOTTOM - 0.07,
            align: Align::Start,
            orientation: Orientation::Vertical,
            color: BLACK,
        });
    }

    // Axis titles.
    commands.push(DrawCommand::Text {
        text: "True label".to_string(),
        anchor: (0.025, top + grid_h / 2.0),
        size: 0.03,
        max_extent: grid_h,
        align: Align::Center,
        orientation: Orientation::Vertical,
        color: BLACK,
    });
    commands.push(DrawCommand::Text {
        text: "Predicted label".to_string(),
        anchor: (left + grid_w / 2.0, 0.975),
        size: 0.03,
        max_extent: grid_w,
        align: Align::Center,
        orientation: Orientation::Horizontal,
        color: BLACK,
    });

    commands
}

/// Minimum and maximum of the finite values, `(0, 0)` if there are none.
fn value_range(matrix: ArrayView2<'_, f32>) -> (f32, f32) {
    let (min, max) = matrix
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

fn format_value(value: f32, integral: bool) -> String {
    if integral {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Linearly rescale all channel values so the minimum becomes 0 and the
/// maximum 255. Flat images are left untouched.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stretch_contrast(image: &mut RgbImage) {
    let (lo, hi) = image
        .as_raw()
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi <= lo || (lo == 0 && hi == 255) {
        return;
    }
    let scale = 255.0 / f32::from(hi - lo);
    for value in image.iter_mut() {
        // Safe: result lies in [0, 255]
        *value = (f32::from(*value - lo) * scale).round().clamp(0.0, 255.0) as u8;
    }
}
