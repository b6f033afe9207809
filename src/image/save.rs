//! Image saving utilities.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageBuffer, ImageError, Rgb};

use crate::error::{Error, Result};

use super::{Image, CHANNELS};

/// Save an array as a PNG file.
///
/// Values are rounded half-to-even and saturated to [0, 255]. The output is
/// always PNG whatever extension `path` carries.
///
/// # Errors
///
/// Returns an error if the array is not a 3-channel image, if its size does
/// not fit the encoder, or if the file cannot be written.
pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> Result<()> {
    let path = path.as_ref();

    let buffer = array_to_image(image)?;
    let save_error = |source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    };

    // Encode fully before touching the filesystem so a failed encode leaves
    // no partial file behind.
    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(buffer)
        .write_with_encoder(PngEncoder::new(&mut encoded))
        .map_err(save_error)?;

    fs::write(path, encoded.into_inner())
        .map_err(|err| save_error(ImageError::IoError(err)))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Name of the output file for `input` once upscaled to `rows` x `cols`.
///
/// The file lands next to the input as `<stem>-<rows>x<cols>.png`.
#[must_use]
pub fn output_path<P: AsRef<Path>>(input: P, rows: usize, cols: usize) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());

    input.with_file_name(format!("{stem}-{rows}x{cols}.png"))
}

/// Convert an HWC array to an RGB image buffer.
fn array_to_image(image: &Image) -> Result<ImageBuffer<Rgb<u8>, Vec<u8>>> {
    let (rows, cols, channels) = image.dim();
    if channels != CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("{CHANNELS} channels"),
            actual: format!("{channels} channels"),
        });
    }

    let too_large = || Error::UnsupportedDimensions {
        width: cols,
        height: rows,
        reason: "exceeds the encoder's u32 limit".to_string(),
    };
    let width = u32::try_from(cols).map_err(|_| too_large())?;
    let height = u32::try_from(rows).map_err(|_| too_large())?;

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        let (r, c) = (y as usize, x as usize);
        Rgb([
            quantize(image[[r, c, 0]]),
            quantize(image[[r, c, 1]]),
            quantize(image[[r, c, 2]]),
        ])
    }))
}

/// Round to the nearest integer (ties to even) and saturate to a byte.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(value: f64) -> u8 {
    // Safe: clamped to [0, 255] before casting; NaN casts to 0
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
