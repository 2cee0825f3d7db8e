use crate::constants::{
    DEFAULT_MAX_DIMENSION, DEFAULT_MAX_SIZE_MB, DEFAULT_QUALITY, DIMENSION_STEP,
    MAX_COMPRESSION_ITERATIONS, MAX_QUALITY, MIN_QUALITY, QUALITY_STEP,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::processing::{decode_image, encode_image, fit_within, scale_by};
use crate::verbose;

/// Constraints handed to the compression step, plus the optional manual
/// conversion target.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOptions {
    /// Target upper bound for each output, in megabytes.
    pub max_size_mb: f64,
    /// Longest allowed edge in pixels.
    pub max_dimension: u32,
    /// Starting quality factor, 0.0-1.0.
    pub initial_quality: f32,
    /// Never shrink dimensions to chase the size target.
    pub preserve_resolution: bool,
    /// Manual conversion target, applied before compression.
    pub convert_to: Option<OutputFormat>,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_dimension: DEFAULT_MAX_DIMENSION,
            initial_quality: f32::from(DEFAULT_QUALITY) / 100.0,
            preserve_resolution: false,
            convert_to: None,
        }
    }
}

impl CompressionOptions {
    /// Builds validated options from user input; `None` picks the default.
    ///
    /// `quality` uses the 1-100 scale and is stored as a factor.
    pub fn new(
        max_size_mb: Option<f64>,
        max_dimension: Option<u32>,
        quality: Option<u8>,
        preserve_resolution: bool,
        convert_to: Option<OutputFormat>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let max_dimension = max_dimension.unwrap_or(DEFAULT_MAX_DIMENSION);
        if max_dimension == 0 {
            return Err(CompressionError::InvalidDimension(max_dimension));
        }

        let max_size_mb = max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB);
        if !max_size_mb.is_finite() || max_size_mb <= 0.0 {
            return Err(CompressionError::InvalidSize(format!(
                "maximum size must be positive, got {} MB",
                max_size_mb
            )));
        }

        Ok(Self {
            max_size_mb,
            max_dimension,
            initial_quality: f32::from(quality) / 100.0,
            preserve_resolution,
            convert_to,
        })
    }

    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Output of one compression run.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
}

/// The "compress image" operation the pipeline delegates to.
///
/// `progress` receives percentages in 0..=100.
pub trait ImageCompressor {
    fn compress(
        &self,
        data: &[u8],
        name: &str,
        options: &CompressionOptions,
        progress: &mut dyn FnMut(u8),
    ) -> Result<CompressedImage>;
}

/// Default compressor: resize to the dimension bound, then step quality (and,
/// unless resolution is preserved, dimensions) down until the size target is
/// met or the iteration budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct QualityStepCompressor {
    pub max_iterations: u32,
}

impl Default for QualityStepCompressor {
    fn default() -> Self {
        Self {
            max_iterations: MAX_COMPRESSION_ITERATIONS,
        }
    }
}

impl ImageCompressor for QualityStepCompressor {
    fn compress(
        &self,
        data: &[u8],
        name: &str,
        options: &CompressionOptions,
        progress: &mut dyn FnMut(u8),
    ) -> Result<CompressedImage> {
        progress(0);

        let (mut img, source) = decode_image(data, name)?;
        // formats we cannot encode fall back to PNG, like a canvas does
        let format = OutputFormat::from_image_format(source).unwrap_or(OutputFormat::Png);

        fit_within(&mut img, options.max_dimension);

        let max_bytes = options.max_size_bytes();
        let mut quality = options.initial_quality;
        let mut output = encode_image(&img, format, quality)?;
        let mut iteration = 0;

        while (output.len() as u64) > max_bytes && iteration < self.max_iterations {
            if format.is_lossless() && options.preserve_resolution {
                break;
            }

            iteration += 1;
            progress(step_progress(iteration, self.max_iterations));

            quality *= QUALITY_STEP;
            if !options.preserve_resolution {
                scale_by(&mut img, DIMENSION_STEP);
            }
            output = encode_image(&img, format, quality)?;
            verbose!(
                "{}: iteration {} quality {:.2} -> {} bytes",
                name,
                iteration,
                quality,
                output.len()
            );
        }

        progress(100);
        Ok(CompressedImage {
            data: output,
            format,
        })
    }
}

fn step_progress(iteration: u32, max_iterations: u32) -> u8 {
    if max_iterations == 0 {
        return 99;
    }
    ((iteration * 100 / max_iterations) as u8).min(99)
}
