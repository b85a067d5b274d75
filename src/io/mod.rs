//! Reading input documents and writing rendered images.

mod load;
mod save;

pub use load::load_json;
pub use save::save_image;
