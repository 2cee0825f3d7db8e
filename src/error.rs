use crate::session::ResultId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid maximum dimension: {0}. Must be greater than 0")]
    InvalidDimension(u32),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Invalid input pattern '{0}': {1}")]
    InvalidPattern(String, String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Empty input: {0} contains no data")]
    EmptyInput(String),

    #[error("Batch too large: {0} images selected, maximum allowed {1}")]
    BatchTooLarge(usize, usize),

    #[error("No result with id {0}")]
    ResultNotFound(ResultId),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
