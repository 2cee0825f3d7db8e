//! Manual format conversion: decode into pixels, re-encode into another container.

use crate::constants::CONVERSION_QUALITY;
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::processing::{decode_image, encode_image};
use crate::verbose;

/// Re-encodes `data` as `target` at the fixed conversion quality.
///
/// PNG and WebP targets are lossless, so the quality factor only selects the
/// PNG deflate strategy for them.
pub fn convert_format(data: &[u8], name: &str, target: OutputFormat) -> Result<Vec<u8>> {
    let (img, source) = decode_image(data, name)?;
    verbose!("Converting {} from {:?} to {}", name, source, target);
    encode_image(&img, target, CONVERSION_QUALITY)
}

/// Whether a file declared as `source_mime` needs converting to reach `target`.
pub fn needs_conversion(source_mime: &str, target: OutputFormat) -> bool {
    OutputFormat::from_mime_type(source_mime) != Some(target)
}
