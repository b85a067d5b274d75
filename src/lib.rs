//! # train-helpers
//!
//! A collection of helpers for training neural networks.
//!
//! - [`training`]: padding sizes of `same` convolutions and tensor padding.
//! - [`visu`]: images for training summaries, such as confusion matrices and
//!   colored 2D tensors.
//! - [`validate`]: conversion of loosely-typed JSON arguments.
//!
//! All operations are pure: they validate their arguments up front and return
//! a freshly allocated result.
//!
//! ## Example
//!
//! ```no_run
//! use ndarray::Array2;
//! use train_helpers::training::{compute_padding, Dims2};
//! use train_helpers::visu::{create_image, ImageOptions};
//!
//! # fn main() -> train_helpers::Result<()> {
//! let quad = compute_padding(Dims2::new(10, 10), Dims2::new(3, 3), Dims2::new(1, 1), None)?;
//! assert_eq!((quad.top, quad.bottom, quad.left, quad.right), (1, 1, 1, 1));
//!
//! let activations = Array2::<f32>::zeros((4, 16));
//! let options = ImageOptions {
//!     expand_height: 8,
//!     ..ImageOptions::default()
//! };
//! let image = create_image(activations.view(), None, &options)?;
//! assert_eq!(image.shape(), &[1, 32, 16, 3]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod io;
pub mod training;
pub mod validate;
pub mod visu;

pub use error::{Error, ErrorKind, Result};
