//! Helpers for building convolutional layers.

mod pad;
mod padding;

pub use pad::{pad, pad_same, pad_with, PadMode};
pub use padding::{compute_padding, Dims2, PaddingQuad};
