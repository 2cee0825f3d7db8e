pub mod logger;

pub mod cli;
pub mod compressor;
pub mod constants;
pub mod convert;
pub mod error;
pub mod export;
pub mod formats;
pub mod input;
pub mod pipeline;
pub mod processing;
pub mod progress;
pub mod session;
pub mod stats;

pub use compressor::{CompressedImage, CompressionOptions, ImageCompressor, QualityStepCompressor};
pub use convert::convert_format;
pub use error::{CompressionError, Result};
pub use export::{export_file_name, export_results};
pub use formats::OutputFormat;
pub use input::{
    collect_batch, collect_input_paths, ensure_within_batch_limit, select_image_paths, InputFile,
    PendingBatch,
};
pub use pipeline::{BatchProcessor, BatchReport, FailedFile, NoProgress, ProgressSink};
pub use session::{
    OptimizedResult, ProcessingStatus, ResultDraft, ResultId, SessionEvent, SessionState,
};
pub use stats::{
    aggregate_reduction_percent, compression_ratio_percent, format_file_size, parse_size,
    BatchTotals,
};
