use crate::constants::{MAX_BATCH_FILES, MAX_FILE_SIZE};
use crate::error::{CompressionError, Result};
use crate::formats::{is_image_mime, mime_type_for_path};
use crate::{verbose, warn};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A selected file: name, declared MIME type and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Reads a file from disk, declaring its type from the extension.
    ///
    /// # Returns
    /// * `Err(CompressionError::FileNotFound)` - If `path` does not exist
    /// * `Err(CompressionError::FileTooLarge)` - If the file exceeds the read limit
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let size = fs::metadata(path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(CompressionError::FileTooLarge(size, MAX_FILE_SIZE));
        }

        Ok(Self {
            name: display_name(path),
            mime_type: mime_type_for_path(path).to_string(),
            data: fs::read(path)?,
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }
}

/// Files accepted from one selection, in selection order.
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    files: Vec<InputFile>,
}

impl PendingBatch {
    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<InputFile> {
        self.files
    }
}

/// Keeps the image files of a selection and enforces the batch limit.
///
/// Non-image files are dropped before counting. A selection with more than
/// [`MAX_BATCH_FILES`] images is rejected as a whole.
pub fn collect_batch(files: Vec<InputFile>) -> Result<PendingBatch> {
    let total = files.len();
    let images: Vec<InputFile> = files.into_iter().filter(InputFile::is_image).collect();

    if images.len() < total {
        verbose!("Ignored {} non-image file(s)", total - images.len());
    }

    ensure_within_batch_limit(images.len())?;
    Ok(PendingBatch { files: images })
}

/// Rejects a selection of more than [`MAX_BATCH_FILES`] images.
pub fn ensure_within_batch_limit(image_count: usize) -> Result<()> {
    if image_count > MAX_BATCH_FILES {
        return Err(CompressionError::BatchTooLarge(image_count, MAX_BATCH_FILES));
    }
    Ok(())
}

/// Keeps the paths whose declared type is `image/*`, without touching their contents.
pub fn select_image_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let images: Vec<PathBuf> = paths
        .iter()
        .filter(|p| is_image_mime(mime_type_for_path(p)))
        .cloned()
        .collect();

    if images.len() < paths.len() {
        verbose!("Ignored {} non-image file(s)", paths.len() - images.len());
    }

    images
}

/// File name shown for `path` in results and reports.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Expands CLI inputs (files, directories, glob patterns) into file paths.
///
/// Directories are walked one level deep unless `recursive`; hidden entries
/// are skipped. Every file found is returned, images or not; callers filter
/// with [`select_image_paths`] before reading anything.
pub fn collect_input_paths(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let input_path = Path::new(input);

        if input_path.is_file() {
            paths.push(input_path.to_path_buf());
        } else if input_path.is_dir() {
            let walker = if recursive {
                WalkDir::new(input_path)
            } else {
                WalkDir::new(input_path).max_depth(1)
            };

            let mut found: Vec<PathBuf> = Vec::new();
            for entry in walker
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            {
                let entry = entry?;
                if entry.file_type().is_file() {
                    found.push(entry.into_path());
                }
            }
            paths.extend(found);
        } else {
            let pattern = glob(input)
                .map_err(|e| CompressionError::InvalidPattern(input.clone(), e.msg.to_string()))?;
            let before = paths.len();
            paths.extend(pattern.flatten().filter(|p| p.is_file()));
            if paths.len() == before {
                warn!("No files matched {}", input);
            }
        }
    }

    Ok(paths)
}
