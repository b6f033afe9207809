//! Image loading, saving, and output naming.

mod load;
mod save;

pub use load::load_image;
pub use save::{output_path, save_image};

use ndarray::Array3;

/// Working image in HWC layout (rows, columns, channels).
///
/// Values are kept as `f64` in the nominal [0, 255] range and are never
/// clipped until the final encode.
pub type Image = Array3<f64>;

/// Number of color planes carried through the pipeline.
pub const CHANNELS: usize = 3;
