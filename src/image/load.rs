//! Image loading utilities.

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageDecoder, ImageError, ImageReader};

use crate::error::{Error, Result};

use super::{Image, CHANNELS};

/// Load an image from disk as a floating-point HWC array.
///
/// Any format the `image` crate can decode is accepted. An EXIF orientation
/// tag is applied, so rows and columns follow the image as displayed. The
/// decoded image is converted to 8-bit RGB first, so an alpha plane is dropped
/// and grayscale is expanded to three identical planes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if it has no
/// pixels.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();

    let img = decode_oriented(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = img.dimensions();
    tracing::debug!("Decoded {} ({width}x{height})", path.display());

    if width == 0 || height == 0 {
        return Err(Error::UnsupportedDimensions {
            width: width as usize,
            height: height as usize,
            reason: "image has no pixels".to_string(),
        });
    }

    Ok(image_to_array(&img))
}

/// Decode `path` and rotate or flip it as its orientation metadata says.
fn decode_oriented(path: &Path) -> std::result::Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::open(path)?.into_decoder()?;
    let orientation = decoder.orientation()?;

    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Convert a `DynamicImage` to an RGB array with values in [0, 255].
pub(crate) fn image_to_array(img: &DynamicImage) -> Image {
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let mut array = Image::zeros((height, width, CHANNELS));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..CHANNELS {
            array[[y as usize, x as usize, c]] = f64::from(pixel[c]);
        }
    }

    array
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_array_layout_is_rows_then_columns() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([10, 20, 30]));

        let array = image_to_array(&DynamicImage::ImageRgb8(img));

        assert_eq!(array.shape(), &[2, 3, 3]);
        assert_eq!(array[[1, 2, 0]], 10.0);
        assert_eq!(array[[1, 2, 1]], 20.0);
        assert_eq!(array[[1, 2, 2]], 30.0);
        assert_eq!(array[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_alpha_plane_is_dropped() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 0]));
        let array = image_to_array(&DynamicImage::ImageRgba8(img));

        assert_eq!(array.shape(), &[2, 2, 3]);
        assert_eq!(array[[0, 0, 2]], 3.0);
    }

    #[test]
    fn test_grayscale_expands_to_three_planes() {
        let img = GrayImage::from_pixel(1, 1, Luma([77]));
        let array = image_to_array(&DynamicImage::ImageLuma8(img));

        assert_eq!(array.shape(), &[1, 1, 3]);
        assert!(array.iter().all(|&v| v == 77.0));
    }

    /// Minimal little-endian TIFF block carrying a single Orientation tag.
    fn exif_orientation(value: u8) -> Vec<u8> {
        let mut exif = b"II\x2a\x00\x08\x00\x00\x00".to_vec();
        exif.extend_from_slice(&[0x01, 0x00]);
        exif.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        exif.extend_from_slice(&[value, 0x00, 0x00, 0x00]);
        exif.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        exif
    }

    #[test]
    fn test_exif_rotation_is_applied() {
        use image::codecs::jpeg::JpegEncoder;
        use image::ImageEncoder;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("portrait.jpg");

        // Stored 12 wide by 8 high, displayed rotated a quarter turn.
        let stored = RgbImage::from_pixel(12, 8, Rgb([200, 100, 50]));
        let mut file = std::fs::File::create(&path).unwrap();
        let mut encoder = JpegEncoder::new_with_quality(&mut file, 95);
        encoder.set_exif_metadata(exif_orientation(6)).unwrap();
        DynamicImage::ImageRgb8(stored)
            .write_with_encoder(encoder)
            .unwrap();
        drop(file);

        let array = load_image(&path).unwrap();

        assert_eq!(array.shape(), &[12, 8, 3]);
    }

    #[test]
    fn test_no_orientation_tag_keeps_layout() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(12, 8, Rgb([1, 2, 3])).save(&path).unwrap();

        let array = load_image(&path).unwrap();

        assert_eq!(array.shape(), &[8, 12, 3]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_image("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
