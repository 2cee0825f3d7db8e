//! Size accounting for compressed results
//!
//! All arithmetic runs on raw byte counts; human-readable strings are only
//! produced for display, or parsed from user input.

use crate::constants::BYTES_PER_KB;
use crate::error::{CompressionError, Result};
use crate::session::OptimizedResult;

const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Percentage size reduction, rounded to the nearest integer.
///
/// Negative when the output is larger than the input. An empty original
/// yields 0.
pub fn compression_ratio_percent(original_size: u64, compressed_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    let saved = original_size as f64 - compressed_size as f64;
    (100.0 * saved / original_size as f64).round() as i64
}

/// Sums over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub count: usize,
    pub original_bytes: u64,
    pub optimized_bytes: u64,
}

impl BatchTotals {
    pub fn from_results(results: &[OptimizedResult]) -> Self {
        results.iter().fold(Self::default(), |totals, r| Self {
            count: totals.count + 1,
            original_bytes: totals.original_bytes + r.original_size,
            optimized_bytes: totals.optimized_bytes + r.optimized_size,
        })
    }

    pub fn saved_bytes(&self) -> i64 {
        self.original_bytes as i64 - self.optimized_bytes as i64
    }

    pub fn reduction_percent(&self) -> i64 {
        compression_ratio_percent(self.original_bytes, self.optimized_bytes)
    }
}

/// Overall reduction across `results`; 0 for an empty list.
pub fn aggregate_reduction_percent(results: &[OptimizedResult]) -> i64 {
    BatchTotals::from_results(results).reduction_percent()
}

/// Format file size in human-readable format
///
/// # Returns
/// * Size string such as "512 Bytes", "1.50 KB" or "2.00 MB"
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= BYTES_PER_KB && unit_index < UNITS.len() - 1 {
        size /= BYTES_PER_KB;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Parses a size like "500KB", "1.5 MB" or "12 Bytes" into bytes.
///
/// Units are case-insensitive and base 1024; a bare number is bytes.
pub fn parse_size(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| CompressionError::InvalidSize(text.to_string()))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => 1.0,
        "k" | "kb" => BYTES_PER_KB,
        "m" | "mb" => BYTES_PER_KB.powi(2),
        "g" | "gb" => BYTES_PER_KB.powi(3),
        _ => return Err(CompressionError::InvalidSize(text.to_string())),
    };

    Ok((value * multiplier).round() as u64)
}
