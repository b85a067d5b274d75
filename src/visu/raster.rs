//! Figure-space draw commands and their rasterisation.
//!
//! Layout code describes a figure as a list of [`DrawCommand`]s in figure
//! coordinates, where `(0, 0)` is the top-left and `(1, 1)` the bottom-right
//! corner. A [`RasterBackend`] turns the list into pixels at a given DPI and
//! figure size.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::error::{Error, Result};

/// Largest figure side the built-in canvas will allocate.
pub const MAX_SIDE_PX: u32 = 16_384;

/// Side length of a glyph in the bitmap font.
const GLYPH_PX: u32 = 8;

/// Axis-aligned rectangle in figure coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Horizontal placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Text starts at the anchor.
    Start,
    /// Text is centered on the anchor.
    Center,
    /// Text ends at the anchor.
    End,
}

/// Reading direction of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left to right.
    Horizontal,
    /// Top to bottom, glyphs rotated a quarter turn clockwise. Alignment then
    /// applies along the vertical axis and the text is centered horizontally.
    Vertical,
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill a rectangle.
    Fill { rect: FigRect, color: Rgb<u8> },
    /// Draw a one pixel wide line segment.
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Rgb<u8>,
    },
    /// Draw a line of text.
    ///
    /// `size` is the glyph height and `max_extent` the longest the text may
    /// run along its reading direction, both in figure units. The backend
    /// picks the largest glyph scale satisfying both.
    Text {
        text: String,
        anchor: (f32, f32),
        size: f32,
        max_extent: f32,
        align: Align,
        orientation: Orientation,
        color: Rgb<u8>,
    },
}

/// Something that rasterises draw commands.
pub trait RasterBackend {
    /// Render `commands` onto a square figure of `dpi * size_inches` pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the figure size is not renderable.
    fn render(&self, commands: &[DrawCommand], dpi: u32, size_inches: f32) -> Result<RgbImage>;
}

/// Pixel side length of a square figure.
///
/// # Errors
///
/// Returns an error if the resulting side is smaller than one pixel or larger
/// than [`MAX_SIDE_PX`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn figure_side(dpi: u32, size_inches: f32) -> Result<u32> {
    let side = (dpi as f32 * size_inches).round();
    if !side.is_finite() || side < 1.0 || side > MAX_SIDE_PX as f32 {
        return Err(Error::invalid_parameter(
            "figure size",
            format!("{dpi} dpi x {size_inches} in must give between 1 and {MAX_SIDE_PX} pixels"),
        ));
    }
    // Safe: checked to lie within [1, MAX_SIDE_PX]
    Ok(side as u32)
}

/// CPU canvas built on `imageproc` primitives with an 8x8 bitmap font.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    /// Color the canvas is cleared to.
    pub background: Rgb<u8>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            background: Rgb([255, 255, 255]),
        }
    }
}

impl RasterBackend for Canvas {
    fn render(&self, commands: &[DrawCommand], dpi: u32, size_inches: f32) -> Result<RgbImage> {
        let side = figure_side(dpi, size_inches)?;
        let mut image = RgbImage::from_pixel(side, side, self.background);
        tracing::trace!("rasterising {} commands onto {side}x{side}", commands.len());

        for command in commands {
            match command {
                DrawCommand::Fill { rect, color } => fill(&mut image, rect, *color),
                DrawCommand::Line { from, to, color } => {
                    let scale = side as f32;
                    draw_line_segment_mut(
                        &mut image,
                        (from.0 * scale, from.1 * scale),
                        (to.0 * scale, to.1 * scale),
                        *color,
                    );
                }
                DrawCommand::Text {
                    text,
                    anchor,
                    size,
                    max_extent,
                    align,
                    orientation,
                    color,
                } => {
                    let glyphs: Vec<[u8; 8]> = text
                        .chars()
                        .map(|c| BASIC_FONTS.get(c).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]))
                        .collect();
                    draw_text(
                        &mut image,
                        &glyphs,
                        TextPlacement {
                            anchor: *anchor,
                            size: *size,
                            max_extent: *max_extent,
                            align: *align,
                            orientation: *orientation,
                        },
                        *color,
                    );
                }
            }
        }
        Ok(image)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn fill(image: &mut RgbImage, rect: &FigRect, color: Rgb<u8>) {
    let scale = image.width() as f32;
    let x0 = (rect.x * scale).round() as i32;
    let y0 = (rect.y * scale).round() as i32;
    let x1 = ((rect.x + rect.width) * scale).round() as i32;
    let y1 = ((rect.y + rect.height) * scale).round() as i32;
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    // Safe: both extents are positive
    #[allow(clippy::cast_sign_loss)]
    let area = Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32);
    draw_filled_rect_mut(image, area, color);
}

struct TextPlacement {
    anchor: (f32, f32),
    size: f32,
    max_extent: f32,
    align: Align,
    orientation: Orientation,
}

/// Integer glyph scale for a text run of `len` glyphs.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn glyph_scale(len: usize, size_px: f32, max_extent_px: f32) -> u32 {
    let by_size = (size_px / GLYPH_PX as f32).floor();
    let by_extent = (max_extent_px / (len.max(1) as f32 * GLYPH_PX as f32)).floor();
    // Safe: clamped to at least 1 and bounded by the figure size
    by_size.min(by_extent).max(1.0) as u32
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn draw_text(image: &mut RgbImage, glyphs: &[[u8; 8]], placement: TextPlacement, color: Rgb<u8>) {
    let side = image.width() as f32;
    let scale = glyph_scale(glyphs.len(), placement.size * side, placement.max_extent * side);
    let glyph = (GLYPH_PX * scale) as i32;
    let run = glyph * glyphs.len() as i32;
    let (ax, ay) = (
        (placement.anchor.0 * side).round() as i32,
        (placement.anchor.1 * side).round() as i32,
    );
    let offset = match placement.align {
        Align::Start => 0,
        Align::Center => run / 2,
        Align::End => run,
    };
    let (x0, y0) = match placement.orientation {
        Orientation::Horizontal => (ax - offset, ay - glyph / 2),
        Orientation::Vertical => (ax - glyph / 2, ay - offset),
    };

    let step = scale as i32;
    for (i, rows) in glyphs.iter().enumerate() {
        let advance = glyph * i as i32;
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..GLYPH_PX as usize {
                if bits & (1 << gx) == 0 {
                    continue;
                }
                let (px, py) = match placement.orientation {
                    Orientation::Horizontal => (
                        x0 + advance + gx as i32 * step,
                        y0 + gy as i32 * step,
                    ),
                    Orientation::Vertical => (
                        x0 + (GLYPH_PX as i32 - 1 - gy as i32) * step,
                        y0 + advance + gx as i32 * step,
                    ),
                };
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}
