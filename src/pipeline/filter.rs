//! Blend, Gaussian blur, and intensity rescaling on whole images.

use std::fmt;

use ndarray::Axis;

use crate::error::{Error, Result};
use crate::image::Image;

/// How samples outside the image are synthesized during convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Mirror without repeating the edge sample: `dcb|abcd|cba`.
    #[default]
    Reflect101,
    /// Repeat the edge sample: `aaa|abcd|ddd`.
    Replicate,
}

impl BorderMode {
    /// Map a possibly out-of-range index onto `[0, len)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn resolve(self, index: isize, len: usize) -> usize {
        let last = len as isize - 1;
        if last <= 0 {
            return 0;
        }

        let mut i = index;
        match self {
            Self::Replicate => i = i.clamp(0, last),
            Self::Reflect101 => {
                // Kernels can be wider than the image, so reflect until inside.
                while i < 0 || i > last {
                    i = if i < 0 { -i } else { 2 * last - i };
                }
            }
        }

        i as usize
    }
}

impl fmt::Display for BorderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reflect101 => f.write_str("reflect-101"),
            Self::Replicate => f.write_str("replicate"),
        }
    }
}

/// Add the accent buffer to the working image: `upscaled + diffs * weight`.
///
/// # Errors
///
/// Returns an error if the two buffers differ in shape.
pub fn blend(upscaled: &Image, diffs: &Image, weight: f64) -> Result<Image> {
    if upscaled.shape() != diffs.shape() {
        return Err(Error::ShapeMismatch {
            expected: format!("{:?}", upscaled.shape()),
            actual: format!("{:?}", diffs.shape()),
        });
    }

    let mut combined = upscaled.clone();
    combined.scaled_add(weight, diffs);
    Ok(combined)
}

/// Kernel length derived from sigma for floating-point images.
///
/// Covers four standard deviations on each side and is always odd, so a
/// sigma of 8 yields 65 taps.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn kernel_size(sigma: f64) -> usize {
    // Safe: callers pass a positive, finite sigma
    let size = (sigma * 8.0 + 1.0).round() as usize;
    size | 1
}

/// Normalized 1-D Gaussian weights `exp(-x² / 2σ²)` of [`kernel_size`] taps.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let size = kernel_size(sigma);
    let center = (size - 1) as f64 * 0.5;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }

    kernel
}

/// Separable Gaussian blur with independent sigma per axis.
///
/// The horizontal pass runs first, then the vertical pass on its output.
///
/// # Errors
///
/// Returns an error if either sigma is not a positive finite number.
pub fn gaussian_blur(image: &Image, sigma_x: f64, sigma_y: f64, border: BorderMode) -> Result<Image> {
    for (name, sigma) in [("sigma_x", sigma_x), ("sigma_y", sigma_y)] {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::invalid(name, "must be a positive finite number"));
        }
    }

    let kx = gaussian_kernel(sigma_x);
    let ky = gaussian_kernel(sigma_y);
    tracing::debug!(
        "Gaussian blur: {}x{} taps, border {border}",
        kx.len(),
        ky.len()
    );

    let horizontal = convolve_along(image, Axis(1), &kx, border);
    Ok(convolve_along(&horizontal, Axis(0), &ky, border))
}

/// 1-D convolution of every lane along `axis` with an odd-length kernel.
fn convolve_along(image: &Image, axis: Axis, kernel: &[f64], border: BorderMode) -> Image {
    let n = image.len_of(axis);
    #[allow(clippy::cast_possible_wrap)]
    let radius = (kernel.len() / 2) as isize;

    let mut out = Image::zeros(image.raw_dim());
    for (i, mut slice) in out.axis_iter_mut(axis).enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let center = i as isize;
        for (k, &weight) in kernel.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let offset = k as isize - radius;
            let src = border.resolve(center + offset, n);
            slice.scaled_add(weight, &image.index_axis(axis, src));
        }
    }

    out
}

/// Clip to `in_range`, then map that range linearly onto `out_range`.
///
/// # Errors
///
/// Returns an error if `in_range` is empty or reversed.
#[allow(clippy::suboptimal_flops)]
pub fn rescale_intensity(image: &Image, in_range: (f64, f64), out_range: (f64, f64)) -> Result<Image> {
    let (in_lo, in_hi) = in_range;
    let (out_lo, out_hi) = out_range;
    if in_lo.is_nan() || in_hi.is_nan() || in_lo >= in_hi {
        return Err(Error::invalid(
            "in_range",
            format!("lower bound {in_lo} must be below upper bound {in_hi}"),
        ));
    }

    let span = in_hi - in_lo;
    let out_span = out_hi - out_lo;
    Ok(image.mapv(|v| {
        let unit = (v.clamp(in_lo, in_hi) - in_lo) / span;
        unit * out_span + out_lo
    }))
}
