//! Main upscaling pipeline: replicate, accentuate, blend, blur, stretch.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::image::{self, Image, CHANNELS};

use super::accent::edge_accents;
use super::filter::{blend, gaussian_blur, rescale_intensity, BorderMode};
use super::replication::replicate;

/// Number of progress ticks: replicate, accentuate, blend, blur, stretch.
const STAGES: u64 = 5;

/// Configuration for the upscaling pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Integer factor applied to both spatial dimensions.
    pub alpha: usize,

    /// Look-ahead distance of the edge-accentuation scans.
    pub beta: usize,

    /// Weight of the accent buffer when blended into the working image.
    pub accent_weight: f64,

    /// Horizontal Gaussian sigma.
    pub blur_sigma_x: f64,

    /// Vertical Gaussian sigma.
    pub blur_sigma_y: f64,

    /// Edge extension used by the blur.
    pub border: BorderMode,

    /// Intensity window stretched onto `stretch_out`. Values outside are clipped.
    pub stretch_in: (f64, f64),

    /// Output intensity range.
    pub stretch_out: (f64, f64),

    /// Draw a progress bar on stderr while stages run.
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: 2,
            beta: 4,
            accent_weight: 0.1,
            blur_sigma_x: 8.0,
            blur_sigma_y: 8.0,
            border: BorderMode::Reflect101,
            stretch_in: (127.5, 255.0),
            stretch_out: (0.0, 255.0),
            show_progress: false,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.alpha == 0 {
            return Err(Error::invalid("alpha", "must be greater than 0"));
        }

        if self.beta == 0 {
            return Err(Error::invalid("beta", "must be greater than 0"));
        }

        if !self.accent_weight.is_finite() {
            return Err(Error::invalid("accent_weight", "must be finite"));
        }

        for (name, sigma) in [
            ("blur_sigma_x", self.blur_sigma_x),
            ("blur_sigma_y", self.blur_sigma_y),
        ] {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(Error::invalid(name, "must be a positive finite number"));
            }
        }

        let (lo, hi) = self.stretch_in;
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(Error::invalid("stretch_in", "lower bound must be below upper bound"));
        }

        Ok(())
    }

    /// Shape of the working image for a source of `rows` x `cols`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, if the upscaled size
    /// overflows, or if `beta` does not fit inside either upscaled dimension.
    pub fn upscaled_dims(&self, rows: usize, cols: usize) -> Result<(usize, usize)> {
        if rows == 0 || cols == 0 {
            return Err(Error::UnsupportedDimensions {
                width: cols,
                height: rows,
                reason: "image has no pixels".to_string(),
            });
        }

        let overflow = || Error::UnsupportedDimensions {
            width: cols,
            height: rows,
            reason: format!("upscaling by {} overflows", self.alpha),
        };
        let new_rows = rows.checked_mul(self.alpha).ok_or_else(overflow)?;
        let new_cols = cols.checked_mul(self.alpha).ok_or_else(overflow)?;

        if self.beta >= new_rows.min(new_cols) {
            return Err(Error::invalid(
                "beta",
                format!(
                    "{} must be smaller than the upscaled size {new_rows}x{new_cols}",
                    self.beta
                ),
            ));
        }

        Ok((new_rows, new_cols))
    }
}

/// Runs the upscaling stages over one image at a time.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::debug!("Initializing pipeline with config: {config:?}");

        Ok(Self { config })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Upscale an image held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not 3-channel, if it is empty, or if
    /// `beta` does not fit the upscaled size.
    pub fn upscale(&self, source: &Image) -> Result<Image> {
        let (rows, cols, channels) = source.dim();
        if channels != CHANNELS {
            return Err(Error::ShapeMismatch {
                expected: format!("{CHANNELS} channels"),
                actual: format!("{channels} channels"),
            });
        }
        let (new_rows, new_cols) = self.config.upscaled_dims(rows, cols)?;

        let pb = self.progress_bar();

        tracing::info!("Replicating {rows}x{cols} -> {new_rows}x{new_cols}...");
        let upscaled = replicate(source, self.config.alpha)?;
        pb.inc(1);

        tracing::info!("Accentuating edges (beta = {})...", self.config.beta);
        let diffs = edge_accents(&upscaled, self.config.beta)?;
        pb.inc(1);

        let combined = blend(&upscaled, &diffs, self.config.accent_weight)?;
        drop(diffs);
        drop(upscaled);
        pb.inc(1);

        tracing::info!(
            "Blurring (sigma {}x{})...",
            self.config.blur_sigma_x,
            self.config.blur_sigma_y
        );
        let blurred = gaussian_blur(
            &combined,
            self.config.blur_sigma_x,
            self.config.blur_sigma_y,
            self.config.border,
        )?;
        drop(combined);
        pb.inc(1);

        tracing::info!("Stretching contrast...");
        let result = rescale_intensity(&blurred, self.config.stretch_in, self.config.stretch_out)?;
        pb.inc(1);

        pb.finish_and_clear();
        Ok(result)
    }

    /// Load `input_path`, upscale it, and write the PNG next to it.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, processing, or saving fails.
    pub fn process<P: AsRef<Path>>(&self, input_path: P) -> Result<PathBuf> {
        let input_path = input_path.as_ref();

        tracing::info!("Processing image: {}", input_path.display());

        let source = image::load_image(input_path)?;
        let (rows, cols, _) = source.dim();
        let (new_rows, new_cols) = self.config.upscaled_dims(rows, cols)?;
        let output_path = image::output_path(input_path, new_rows, new_cols);

        let result = self.upscale(&source)?;

        tracing::info!("Saving output to: {}", output_path.display());
        image::save_image(&result, &output_path)?;

        tracing::info!("Processing complete");
        Ok(output_path)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(STAGES);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Upscaling [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("valid template")
                .progress_chars("#>-"),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_factors() {
        let config = Config {
            alpha: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { name, .. }) if name == "alpha"
        ));

        let config = Config {
            beta: 0,
            ..Config::default()
        };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_validate_rejects_reversed_stretch() {
        let config = Config {
            stretch_in: (255.0, 127.5),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            stretch_in: (127.5, f64::NAN),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upscaled_dims() {
        let config = Config {
            alpha: 3,
            beta: 2,
            ..Config::default()
        };
        assert_eq!(config.upscaled_dims(100, 50).unwrap(), (300, 150));
    }

    #[test]
    fn test_beta_must_fit_upscaled_size() {
        let config = Config {
            alpha: 2,
            beta: 4,
            ..Config::default()
        };
        assert!(config.upscaled_dims(3, 2).is_err());
        assert!(config.upscaled_dims(3, 3).is_ok());
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            Config::default().upscaled_dims(0, 10),
            Err(Error::UnsupportedDimensions { .. })
        ));
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_upscale_shape_and_range() {
        let source = Array3::from_shape_fn((6, 4, 3), |(r, c, ch)| {
            (r * 40 + c * 25 + ch * 10) as f64
        });
        let pipeline = Pipeline::new(Config {
            alpha: 2,
            beta: 3,
            ..Config::default()
        })
        .unwrap();

        let out = pipeline.upscale(&source).unwrap();

        assert_eq!(out.shape(), &[12, 8, 3]);
        assert!(out.iter().all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn test_upscale_rejects_four_channels() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let source = Image::zeros((4, 4, 4));
        assert!(matches!(
            pipeline.upscale(&source),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
