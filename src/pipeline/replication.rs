//! Nearest-neighbor replication along columns and rows.

use ndarray::Axis;

use crate::error::{Error, Result};
use crate::image::Image;

/// Widen an image by `alpha`, repeating every column `alpha` times.
///
/// Output column `j` is a copy of source column `j / alpha`.
///
/// # Errors
///
/// Returns an error if `alpha` is zero.
pub fn replicate_columns(src: &Image, alpha: usize) -> Result<Image> {
    repeat_along(src, Axis(1), alpha)
}

/// Heighten an image by `alpha`, repeating every row `alpha` times.
///
/// Output row `i` is a copy of source row `i / alpha`.
///
/// # Errors
///
/// Returns an error if `alpha` is zero.
pub fn replicate_rows(src: &Image, alpha: usize) -> Result<Image> {
    repeat_along(src, Axis(0), alpha)
}

/// Expand both spatial dimensions by `alpha`, columns first.
///
/// # Errors
///
/// Returns an error if `alpha` is zero.
pub fn replicate(src: &Image, alpha: usize) -> Result<Image> {
    let upscaled_y = replicate_columns(src, alpha)?;
    replicate_rows(&upscaled_y, alpha)
}

fn repeat_along(src: &Image, axis: Axis, alpha: usize) -> Result<Image> {
    if alpha == 0 {
        return Err(Error::invalid("alpha", "must be greater than 0"));
    }

    let mut shape = src.raw_dim();
    shape[axis.index()] *= alpha;

    let mut dst = Image::zeros(shape);
    for (i, mut lane) in dst.axis_iter_mut(axis).enumerate() {
        lane.assign(&src.index_axis(axis, i / alpha));
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_single_pixel_fills_block() {
        let src = array![[[10.0, 20.0, 30.0]]];
        let out = replicate(&src, 2).unwrap();

        assert_eq!(out.shape(), &[2, 2, 3]);
        for r in 0..2 {
            for c in 0..2 {
                assert_eq!(out[[r, c, 0]], 10.0);
                assert_eq!(out[[r, c, 1]], 20.0);
                assert_eq!(out[[r, c, 2]], 30.0);
            }
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_columns_only_touch_width() {
        let src = Array3::from_shape_fn((2, 3, 3), |(r, c, ch)| (r * 100 + c * 10 + ch) as f64);
        let out = replicate_columns(&src, 3).unwrap();

        assert_eq!(out.shape(), &[2, 9, 3]);
        for j in 0..9 {
            assert_eq!(out.index_axis(Axis(1), j), src.index_axis(Axis(1), j / 3));
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_rows_only_touch_height() {
        let src = Array3::from_shape_fn((3, 2, 3), |(r, c, ch)| (r * 100 + c * 10 + ch) as f64);
        let out = replicate_rows(&src, 2).unwrap();

        assert_eq!(out.shape(), &[6, 2, 3]);
        for i in 0..6 {
            assert_eq!(out.index_axis(Axis(0), i), src.index_axis(Axis(0), i / 2));
        }
    }

    #[test]
    fn test_shape_invariant() {
        for (rows, cols, alpha) in [(1, 1, 1), (4, 7, 3), (5, 2, 4)] {
            let src = Image::zeros((rows, cols, 3));
            let out = replicate(&src, alpha).unwrap();
            assert_eq!(out.shape(), &[rows * alpha, cols * alpha, 3]);
        }
    }

    #[test]
    fn test_alpha_one_is_identity() {
        let src = array![[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]];
        assert_eq!(replicate(&src, 1).unwrap(), src);
    }

    #[test]
    fn test_zero_alpha_rejected() {
        let src = Image::zeros((1, 1, 3));
        assert!(matches!(
            replicate(&src, 0),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
