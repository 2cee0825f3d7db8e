//! Sequential batch processing: one file at a time, in selection order.

use crate::compressor::{CompressionOptions, ImageCompressor, QualityStepCompressor};
use crate::constants::CONVERSION_PROGRESS_SHARE;
use crate::convert::{convert_format, needs_conversion};
use crate::error::Result;
use crate::input::{
    collect_batch, display_name, ensure_within_batch_limit, select_image_paths, InputFile,
    PendingBatch,
};
use crate::session::{OptimizedResult, ProcessingStatus, ResultDraft, SessionEvent, SessionState};
use crate::{error, verbose};
use std::borrow::Cow;
use std::path::PathBuf;

/// Receives status updates while a batch runs.
pub trait ProgressSink {
    fn on_status(&self, _status: &ProcessingStatus) {}
    fn on_result(&self, _result: &OptimizedResult) {}
    fn on_failure(&self, _file_name: &str, _reason: &str) {}
    fn on_finished(&self, _report: &BatchReport) {}
}

/// Sink that ignores everything.
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// A file that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedFile>,
}

pub struct BatchProcessor<C = QualityStepCompressor> {
    compressor: C,
    options: CompressionOptions,
}

impl BatchProcessor<QualityStepCompressor> {
    pub fn new(options: CompressionOptions) -> Self {
        Self::with_compressor(QualityStepCompressor::default(), options)
    }
}

impl<C: ImageCompressor> BatchProcessor<C> {
    pub fn with_compressor(compressor: C, options: CompressionOptions) -> Self {
        Self {
            compressor,
            options,
        }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Collects and processes one selection.
    ///
    /// A rejected selection returns the error and leaves `state` untouched.
    pub fn submit(
        &self,
        state: &mut SessionState,
        files: Vec<InputFile>,
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport> {
        let batch = collect_batch(files)?;
        Ok(self.process_batch(state, batch, sink))
    }

    /// Collects and processes files found on disk.
    ///
    /// Only paths declared as images are read. An image that cannot be read
    /// is reported as failed like any other per-file error.
    pub fn submit_paths(
        &self,
        state: &mut SessionState,
        paths: &[PathBuf],
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport> {
        let images = select_image_paths(paths);
        ensure_within_batch_limit(images.len())?;

        let mut report = BatchReport::default();
        let mut files = Vec::with_capacity(images.len());
        for path in &images {
            match InputFile::from_path(path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    let file_name = display_name(path);
                    error!("Failed to read {}: {}", file_name, e);
                    record_failure(&mut report, sink, file_name, e.to_string());
                }
            }
        }
        report.submitted = report.failed.len();

        let batch = collect_batch(files)?;
        Ok(self.run(state, batch, report, sink))
    }

    /// Processes an accepted batch; per-file failures are logged and skipped.
    pub fn process_batch(
        &self,
        state: &mut SessionState,
        batch: PendingBatch,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        self.run(state, batch, BatchReport::default(), sink)
    }

    fn run(
        &self,
        state: &mut SessionState,
        batch: PendingBatch,
        mut report: BatchReport,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        report.submitted += batch.len();

        for file in batch.into_files() {
            dispatch(
                state,
                SessionEvent::FileStarted {
                    file_name: file.name.clone(),
                    declared_format: file.mime_type.clone(),
                },
            );
            notify_status(state, sink);

            match self.process_file(state, &file, sink) {
                Ok(draft) => {
                    dispatch(state, SessionEvent::ResultAdded(draft));
                    if let Some(result) = state.results().last() {
                        verbose!(
                            "{}: {} -> {} ({}%)",
                            result.original_name,
                            result.original_size_display(),
                            result.optimized_size_display(),
                            result.compression_ratio_percent
                        );
                        sink.on_result(result);
                    }
                    report.succeeded += 1;
                }
                Err(e) => {
                    error!("Failed to process {}: {}", file.name, e);
                    record_failure(&mut report, sink, file.name, e.to_string());
                }
            }
        }

        dispatch(state, SessionEvent::BatchFinished);
        sink.on_finished(&report);
        report
    }

    fn process_file(
        &self,
        state: &mut SessionState,
        file: &InputFile,
        sink: &dyn ProgressSink,
    ) -> Result<ResultDraft> {
        let conversion = self
            .options
            .convert_to
            .filter(|target| needs_conversion(&file.mime_type, *target));

        let (input, offset): (Cow<'_, [u8]>, u8) = match conversion {
            Some(target) => {
                let converted = convert_format(&file.data, &file.name, target)?;
                report_progress(state, sink, CONVERSION_PROGRESS_SHARE);
                (Cow::Owned(converted), CONVERSION_PROGRESS_SHARE)
            }
            None => (Cow::Borrowed(file.data.as_slice()), 0),
        };

        let compressed = self.compressor.compress(
            &input,
            &file.name,
            &self.options,
            &mut |percent: u8| {
                report_progress(state, sink, scale_progress(offset, percent));
            },
        )?;

        Ok(ResultDraft {
            original_name: file.name.clone(),
            source_format: file.mime_type.clone(),
            result_format: compressed.format,
            original_size: file.size(),
            data: compressed.data,
            converted: conversion.is_some(),
        })
    }
}

/// Maps a 0-100 step percentage into the `offset..=100` window.
pub fn scale_progress(offset: u8, percent: u8) -> u8 {
    let offset = u32::from(offset.min(100));
    let percent = u32::from(percent.min(100));
    (offset + (100 - offset) * percent / 100) as u8
}

fn record_failure(
    report: &mut BatchReport,
    sink: &dyn ProgressSink,
    file_name: String,
    reason: String,
) {
    sink.on_failure(&file_name, &reason);
    report.failed.push(FailedFile { file_name, reason });
}

fn dispatch(state: &mut SessionState, event: SessionEvent) {
    *state = std::mem::take(state).apply(event);
}

fn report_progress(state: &mut SessionState, sink: &dyn ProgressSink, percent: u8) {
    dispatch(state, SessionEvent::ProgressUpdated(percent));
    notify_status(state, sink);
}

fn notify_status(state: &SessionState, sink: &dyn ProgressSink) {
    if let Some(status) = state.status() {
        sink.on_status(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::CompressedImage;
    use crate::error::CompressionError;
    use crate::constants::MAX_FILE_SIZE;
    use crate::formats::OutputFormat;
    use crate::processing::encode_image;
    use image::DynamicImage;
    use std::cell::RefCell;
    use std::fs::{self, File};
    use tempfile::TempDir;

    /// Returns a payload of a fixed fraction of the input length.
    struct ShrinkBy(f64);

    impl ImageCompressor for ShrinkBy {
        fn compress(
            &self,
            data: &[u8],
            name: &str,
            _options: &CompressionOptions,
            progress: &mut dyn FnMut(u8),
        ) -> Result<crate::compressor::CompressedImage> {
            if name.starts_with("bad") {
                return Err(CompressionError::UnsupportedFormat(name.to_string()));
            }
            progress(0);
            progress(50);
            progress(100);
            Ok(CompressedImage {
                data: vec![0u8; (data.len() as f64 * self.0) as usize],
                format: OutputFormat::Jpeg,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: RefCell<Vec<(String, u8)>>,
        failures: RefCell<Vec<String>>,
    }

    impl ProgressSink for Recorder {
        fn on_status(&self, status: &ProcessingStatus) {
            self.progress
                .borrow_mut()
                .push((status.file_name.clone(), status.progress_percent));
        }

        fn on_failure(&self, file_name: &str, _reason: &str) {
            self.failures.borrow_mut().push(file_name.to_string());
        }
    }

    fn image(name: &str, len: usize) -> InputFile {
        InputFile::new(name, "image/jpeg", vec![1u8; len])
    }

    #[test]
    fn test_failed_file_does_not_abort_batch() {
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), CompressionOptions::default());
        let mut state = SessionState::new();
        let recorder = Recorder::default();

        let report = processor
            .submit(
                &mut state,
                vec![image("a.jpg", 100), image("bad.jpg", 100), image("c.jpg", 100)],
                &recorder,
            )
            .unwrap();

        assert_eq!(report.submitted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed[0].file_name, "bad.jpg");
        assert_eq!(*recorder.failures.borrow(), vec!["bad.jpg".to_string()]);

        let names: Vec<&str> = state.results().iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert!(state.status().is_none());
    }

    #[test]
    fn test_rejected_batch_leaves_state_untouched() {
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), CompressionOptions::default());
        let mut state = SessionState::new();
        processor
            .submit(&mut state, vec![image("keep.jpg", 10)], &NoProgress)
            .unwrap();

        let too_many = (0..11).map(|i| image(&format!("{}.jpg", i), 10)).collect();
        let result = processor.submit(&mut state, too_many, &NoProgress);

        assert!(matches!(result, Err(CompressionError::BatchTooLarge(11, 10))));
        assert_eq!(state.results().len(), 1);
        assert_eq!(state.results()[0].original_name, "keep.jpg");
    }

    #[test]
    fn test_results_accumulate_across_batches() {
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.25), CompressionOptions::default());
        let mut state = SessionState::new();
        processor
            .submit(&mut state, vec![image("a.jpg", 1000)], &NoProgress)
            .unwrap();
        processor
            .submit(&mut state, vec![image("b.jpg", 1000)], &NoProgress)
            .unwrap();

        assert_eq!(state.results().len(), 2);
        assert_eq!(state.results()[1].compression_ratio_percent, 75);
        assert_eq!(state.aggregate_reduction_percent(), 75);
    }

    #[test]
    fn test_progress_without_conversion_spans_full_range() {
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), CompressionOptions::default());
        let mut state = SessionState::new();
        let recorder = Recorder::default();
        processor
            .submit(&mut state, vec![image("a.jpg", 10)], &recorder)
            .unwrap();

        let seen: Vec<u8> = recorder.progress.borrow().iter().map(|(_, p)| *p).collect();
        assert_eq!(seen, vec![0, 0, 50, 100]);
    }

    #[test]
    fn test_conversion_skipped_when_formats_match() {
        let options = CompressionOptions {
            convert_to: Some(OutputFormat::Jpeg),
            ..CompressionOptions::default()
        };
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), options);
        let mut state = SessionState::new();
        processor
            .submit(&mut state, vec![image("a.jpg", 10)], &NoProgress)
            .unwrap();

        assert!(!state.results()[0].converted);
    }

    #[test]
    fn test_conversion_takes_first_quarter_of_progress() {
        let options = CompressionOptions {
            convert_to: Some(OutputFormat::WebP),
            ..CompressionOptions::default()
        };
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), options);
        let mut state = SessionState::new();
        let recorder = Recorder::default();
        let png = encode_image(&DynamicImage::new_rgb8(8, 8), OutputFormat::Png, 0.8).unwrap();

        processor
            .submit(&mut state, vec![InputFile::new("art.png", "image/png", png)], &recorder)
            .unwrap();

        let seen: Vec<u8> = recorder.progress.borrow().iter().map(|(_, p)| *p).collect();
        assert_eq!(seen, vec![0, 25, 25, 62, 100]);
        assert!(state.results()[0].converted);
        assert_eq!(state.results()[0].source_format, "image/png");
    }

    #[test]
    fn test_submit_paths_reads_only_images() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), vec![7u8; 64]).unwrap();
        File::create(temp_dir.path().join("movie.mp4"))
            .unwrap()
            .set_len(MAX_FILE_SIZE + 1)
            .unwrap();
        File::create(temp_dir.path().join("huge.png"))
            .unwrap()
            .set_len(MAX_FILE_SIZE + 1)
            .unwrap();
        let paths = vec![
            temp_dir.path().join("a.png"),
            temp_dir.path().join("movie.mp4"),
            temp_dir.path().join("huge.png"),
            temp_dir.path().join("gone.jpg"),
        ];

        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), CompressionOptions::default());
        let mut state = SessionState::new();
        let recorder = Recorder::default();
        let report = processor.submit_paths(&mut state, &paths, &recorder).unwrap();

        assert_eq!(report.submitted, 3);
        assert_eq!(report.succeeded, 1);
        let failed: Vec<&str> = report.failed.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(failed, vec!["huge.png", "gone.jpg"]);
        assert_eq!(
            *recorder.failures.borrow(),
            vec!["huge.png".to_string(), "gone.jpg".to_string()]
        );
        assert_eq!(state.results().len(), 1);
        assert_eq!(state.results()[0].original_name, "a.png");
    }

    #[test]
    fn test_submit_paths_rejects_before_reading() {
        let processor = BatchProcessor::with_compressor(ShrinkBy(0.5), CompressionOptions::default());
        let mut state = SessionState::new();
        let paths: Vec<PathBuf> = (0..11)
            .map(|i| PathBuf::from(format!("/nonexistent/{}.png", i)))
            .collect();

        let result = processor.submit_paths(&mut state, &paths, &NoProgress);

        assert!(matches!(result, Err(CompressionError::BatchTooLarge(11, 10))));
        assert!(state.results().is_empty());
        assert!(state.status().is_none());
    }

    #[test]
    fn test_scale_progress() {
        assert_eq!(scale_progress(0, 40), 40);
        assert_eq!(scale_progress(25, 0), 25);
        assert_eq!(scale_progress(25, 100), 100);
        assert_eq!(scale_progress(25, 50), 62);
        assert_eq!(scale_progress(25, 250), 100);
    }
}
