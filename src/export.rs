use crate::convert::convert_format;
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::session::OptimizedResult;
use crate::verbose;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Builds the export file name for `original_name` saved as `format`.
///
/// # Example
/// ```
/// use img_shrink::export::export_file_name;
/// use img_shrink::OutputFormat;
///
/// assert_eq!(export_file_name("holiday.png", OutputFormat::WebP), "holiday.webp");
/// ```
pub fn export_file_name(original_name: &str, format: OutputFormat) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());

    format!("{}.{}", stem, format.extension())
}

/// Writes every result into `output_dir`.
///
/// When `target` is set and differs from a result's format, the result is
/// converted on the way out. Names that collide within one export get the
/// result id appended.
///
/// # Returns
/// * `Ok(paths)` - The written files, in result order
pub fn export_results(
    results: &[OptimizedResult],
    output_dir: &Path,
    target: Option<OutputFormat>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output_dir.to_path_buf()))?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(results.len());

    for result in results {
        let format = target.unwrap_or(result.result_format);
        let data: Cow<'_, [u8]> = if format == result.result_format {
            Cow::Borrowed(result.data())
        } else {
            verbose!("Converting {} to {} for export", result.original_name, format);
            Cow::Owned(convert_format(result.data(), &result.original_name, format)?)
        };

        let name = unique_name(
            &mut used,
            export_file_name(&result.original_name, format),
            format,
            result.id.0,
        );

        let path = output_dir.join(&name);
        write_atomically(&path, output_dir, &data)?;
        written.push(path);
    }

    Ok(written)
}

/// Claims `name`, or the first free `stem-<id>[-n].ext` variant of it.
fn unique_name(used: &mut HashSet<String>, name: String, format: OutputFormat, id: u64) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let suffix = format!(".{}", format.extension());
    let stem = name.strip_suffix(suffix.as_str()).unwrap_or(&name);
    let base = format!("{}-{}", stem, id);

    let mut attempt = 1u32;
    loop {
        let candidate = if attempt == 1 {
            format!("{}{}", base, suffix)
        } else {
            format!("{}-{}{}", base, attempt, suffix)
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        attempt += 1;
    }
}

fn write_atomically(path: &Path, dir: &Path, data: &[u8]) -> Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.persist(path).map_err(|e| CompressionError::Io(e.error))?;
    Ok(())
}
