use crate::constants::{
    HIGH_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, OXIPNG_PRESET,
    ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::verbose;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::num::NonZeroU8;

/// Sniffs the container of `data` and decodes it into a pixel buffer.
///
/// # Arguments
/// * `data` - Encoded image bytes
/// * `name` - File name, used only for error reporting
///
/// # Returns
/// * `Ok((image, format))` - Decoded pixels and the sniffed container format
/// * `Err(CompressionError::EmptyInput)` - If `data` is empty
/// * `Err(CompressionError::ImageProcessing)` - If the data is not a decodable image
pub fn decode_image(data: &[u8], name: &str) -> Result<(DynamicImage, ImageFormat)> {
    if data.is_empty() {
        return Err(CompressionError::EmptyInput(name.to_string()));
    }

    let format = image::guess_format(data)?;
    let img = image::load_from_memory_with_format(data, format)?;
    verbose!(
        "Decoded {} as {:?} ({}x{})",
        name,
        format,
        img.width(),
        img.height()
    );

    Ok((img, format))
}

/// Downscales so the longest edge is at most `max_dimension`, keeping the aspect ratio.
///
/// Images already within bounds are left untouched.
pub fn fit_within(img: &mut DynamicImage, max_dimension: u32) {
    let (width, height) = img.dimensions();
    if max_dimension == 0 || width.max(height) <= max_dimension {
        return;
    }

    *img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    verbose!(
        "Resized {}x{} -> {}x{}",
        width,
        height,
        img.width(),
        img.height()
    );
}

/// Shrinks both edges by `factor`, never below one pixel.
pub fn scale_by(img: &mut DynamicImage, factor: f32) {
    let (width, height) = img.dimensions();
    let new_width = ((width as f32 * factor).round() as u32).max(1);
    let new_height = ((height as f32 * factor).round() as u32).max(1);
    if (new_width, new_height) == (width, height) {
        return;
    }

    *img = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
}

/// Maps a 0.0-1.0 quality factor onto the encoder's 1-100 scale.
pub fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encodes `img` into `format` entirely in memory.
///
/// `quality` is a factor in 0.0-1.0. JPEG uses it directly; PNG uses it to
/// pick an oxipng deflate strategy; WebP output is lossless and ignores it.
pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            // JPEG carries no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality_to_percent(quality));
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buffer);
            if matches!(img.color(), ColorType::Rgb32F | ColorType::Rgba32F) {
                DynamicImage::ImageRgba16(img.to_rgba16()).write_with_encoder(encoder)?;
            } else {
                img.write_with_encoder(encoder)?;
            }
            buffer = optimize_png(&buffer, quality)?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
        }
    }

    Ok(buffer)
}

/// Runs oxipng over an encoded PNG, choosing the deflater from `quality`.
pub fn optimize_png(data: &[u8], quality: f32) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= HIGH_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    oxipng::optimize_from_memory(data, &options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_decode_empty_input() {
        let result = decode_image(&[], "empty.png");
        assert!(matches!(result, Err(CompressionError::EmptyInput(_))));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_image(b"definitely not an image", "junk.png");
        assert!(matches!(result, Err(CompressionError::ImageProcessing(_))));
    }

    #[test]
    fn test_encode_then_decode_reports_format() {
        let img = gradient(32, 16);
        let png = encode_image(&img, OutputFormat::Png, 0.8).unwrap();
        let (decoded, format) = decode_image(&png, "g.png").unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(decoded.dimensions(), (32, 16));
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let img = gradient(128, 128);
        let high = encode_image(&img, OutputFormat::Jpeg, 0.95).unwrap();
        let low = encode_image(&img, OutputFormat::Jpeg, 0.2).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_webp_encoding_produces_webp() {
        let img = gradient(16, 16);
        let webp = encode_image(&img, OutputFormat::WebP, 0.5).unwrap();
        assert_eq!(image::guess_format(&webp).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_fit_within_landscape() {
        let mut img = DynamicImage::new_rgb8(2000, 1000);
        fit_within(&mut img, 1000);
        assert_eq!(img.dimensions(), (1000, 500));
    }

    #[test]
    fn test_fit_within_already_small() {
        let mut img = DynamicImage::new_rgb8(800, 600);
        fit_within(&mut img, 1920);
        assert_eq!(img.dimensions(), (800, 600));
    }

    #[test]
    fn test_scale_by_never_reaches_zero() {
        let mut img = DynamicImage::new_rgb8(1, 1);
        scale_by(&mut img, 0.5);
        assert_eq!(img.dimensions(), (1, 1));

        let mut img = DynamicImage::new_rgb8(200, 100);
        scale_by(&mut img, 0.5);
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn test_quality_to_percent() {
        assert_eq!(quality_to_percent(0.8), 80);
        assert_eq!(quality_to_percent(0.0), 1);
        assert_eq!(quality_to_percent(1.5), 100);
    }
}
