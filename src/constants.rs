/// Largest number of images accepted from one selection.
pub const MAX_BATCH_FILES: usize = 10;

/// Per-file read limit (100 MiB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_MAX_SIZE_MB: f64 = 1.0;
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Quality factor used when re-encoding into another container.
pub const CONVERSION_QUALITY: f32 = 0.9;

/// Share of the reported progress taken by a format conversion.
pub const CONVERSION_PROGRESS_SHARE: u8 = 25;

pub const MAX_COMPRESSION_ITERATIONS: u32 = 10;
pub const QUALITY_STEP: f32 = 0.95;
pub const DIMENSION_STEP: f32 = 0.95;

pub const ZOPFLI_QUALITY_THRESHOLD: f32 = 0.95;
pub const HIGH_QUALITY_THRESHOLD: f32 = 0.7;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

pub const BYTES_PER_KB: f64 = 1024.0;

pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
