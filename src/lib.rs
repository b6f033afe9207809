//! # smoothed-upscale
//!
//! Integer-factor image upscaling with directional edge accentuation.
//!
//! An image is enlarged by nearest-neighbor replication, then each axis is
//! scanned for forward differences `beta` pixels ahead to build an accent
//! buffer. A tenth of that buffer is added back, the result is smoothed with
//! a wide Gaussian (sigma 8), and intensities in `[127.5, 255]` are
//! stretched over the full `[0, 255]` range.
//!
//! ## Example
//!
//! ```no_run
//! use smoothed_upscale::{Config, Pipeline};
//!
//! # fn main() -> smoothed_upscale::Result<()> {
//! let config = Config {
//!     alpha: 3,
//!     beta: 4,
//!     ..Config::default()
//! };
//! let pipeline = Pipeline::new(config)?;
//!
//! // Writes photo-<rows>x<cols>.png next to the input.
//! let written = pipeline.process("photo.jpg")?;
//! println!("{}", written.display());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod pipeline;

pub use error::{Error, Result};
pub use image::Image;
pub use pipeline::{BorderMode, Config, Pipeline};
