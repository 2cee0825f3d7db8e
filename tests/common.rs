#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96])
    }))
}

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    gradient_image(width, height)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Writes a real image file and returns its path.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(&encoded_image(width, height, format))
        .unwrap();
    path
}

pub fn write_text(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(b"not an image").unwrap();
    path
}

/// Creates `count` small PNG files named `img0.png`, `img1.png`, ...
pub fn create_png_batch(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| write_image(dir, &format!("img{}.png", i), 16, 16, ImageFormat::Png))
        .collect()
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
