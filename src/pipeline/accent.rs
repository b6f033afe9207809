//! Directional edge accentuation over the upscaled working image.
//!
//! Each axis is scanned on its own. At position `c` the forward difference
//! `x[c + beta] - x[c]` is taken (zero once `c + beta` leaves the image), and
//! every slice in the window `c .. c + min(beta, n - c - 1)` receives itself
//! plus that difference ramped by `b / beta`. Slices covered by several
//! windows accumulate several contributions.

use ndarray::{Array2, Axis, Zip};

use crate::error::{Error, Result};
use crate::image::Image;

/// Accumulator for the per-column scan (walks along the width).
///
/// # Errors
///
/// Returns an error if `beta` is zero.
pub fn accentuate_columns(upscaled: &Image, beta: usize) -> Result<Image> {
    let mut acc = Image::zeros(upscaled.raw_dim());
    accumulate_along(upscaled, &mut acc, Axis(1), beta)?;
    Ok(acc)
}

/// Accumulator for the per-row scan (walks along the height).
///
/// # Errors
///
/// Returns an error if `beta` is zero.
pub fn accentuate_rows(upscaled: &Image, beta: usize) -> Result<Image> {
    let mut acc = Image::zeros(upscaled.raw_dim());
    accumulate_along(upscaled, &mut acc, Axis(0), beta)?;
    Ok(acc)
}

/// Average of the column and row accumulators.
///
/// Both scans add into one zeroed buffer, which is then halved, so pixels
/// reached from both directions are counted twice before averaging.
///
/// # Errors
///
/// Returns an error if `beta` is zero.
pub fn edge_accents(upscaled: &Image, beta: usize) -> Result<Image> {
    let mut diffs = Image::zeros(upscaled.raw_dim());

    accumulate_along(upscaled, &mut diffs, Axis(1), beta)?;
    tracing::debug!("Column accentuation done");
    accumulate_along(upscaled, &mut diffs, Axis(0), beta)?;
    tracing::debug!("Row accentuation done");

    diffs /= 2.0;
    Ok(diffs)
}

/// Scan `axis` of `upscaled`, adding window contributions into `acc`.
#[allow(clippy::cast_precision_loss)]
fn accumulate_along(upscaled: &Image, acc: &mut Image, axis: Axis, beta: usize) -> Result<()> {
    if beta == 0 {
        return Err(Error::invalid("beta", "must be greater than 0"));
    }
    if acc.shape() != upscaled.shape() {
        return Err(Error::ShapeMismatch {
            expected: format!("{:?}", upscaled.shape()),
            actual: format!("{:?}", acc.shape()),
        });
    }

    let n = upscaled.len_of(axis);
    let step = beta as f64;

    for c in 0..n {
        let here = upscaled.index_axis(axis, c);
        let diff = if c + beta < n {
            &upscaled.index_axis(axis, c + beta) - &here
        } else {
            Array2::zeros(here.raw_dim())
        };

        // The window stops one short of the far edge even when the
        // difference above is still in bounds.
        for b in 0..beta.min(n - c - 1) {
            let ramp = b as f64 / step;
            Zip::from(acc.index_axis_mut(axis, c + b))
                .and(upscaled.index_axis(axis, c + b))
                .and(&diff)
                .for_each(|a, &u, &d| *a += u + d * ramp);
        }
    }

    Ok(())
}
