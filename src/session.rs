//! In-memory session state: the ordered result list and the live processing
//! status, changed only through [`SessionState::apply`].

use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::stats::{aggregate_reduction_percent, compression_ratio_percent, format_file_size};
use std::fmt;

/// Identifier assigned to each result when it enters the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(pub u64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The file currently being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStatus {
    pub file_name: String,
    pub declared_format: String,
    pub progress_percent: u8,
}

/// A compressed file before the session has given it an id.
#[derive(Debug, Clone)]
pub struct ResultDraft {
    pub original_name: String,
    pub source_format: String,
    pub result_format: OutputFormat,
    pub original_size: u64,
    pub data: Vec<u8>,
    pub converted: bool,
}

/// One successfully compressed file, owned by the session until deleted.
#[derive(Debug, Clone)]
pub struct OptimizedResult {
    pub id: ResultId,
    pub original_name: String,
    /// Declared MIME type of the input file.
    pub source_format: String,
    pub result_format: OutputFormat,
    pub original_size: u64,
    pub optimized_size: u64,
    pub compression_ratio_percent: i64,
    pub converted: bool,
    data: Vec<u8>,
}

impl OptimizedResult {
    fn from_draft(id: ResultId, draft: ResultDraft) -> Self {
        let optimized_size = draft.data.len() as u64;
        Self {
            id,
            compression_ratio_percent: compression_ratio_percent(
                draft.original_size,
                optimized_size,
            ),
            original_name: draft.original_name,
            source_format: draft.source_format,
            result_format: draft.result_format,
            original_size: draft.original_size,
            optimized_size,
            converted: draft.converted,
            data: draft.data,
        }
    }

    /// The compressed bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn original_size_display(&self) -> String {
        format_file_size(self.original_size)
    }

    pub fn optimized_size_display(&self) -> String {
        format_file_size(self.optimized_size)
    }
}

/// Transitions accepted by [`SessionState::apply`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileStarted {
        file_name: String,
        declared_format: String,
    },
    ProgressUpdated(u8),
    ResultAdded(ResultDraft),
    BatchFinished,
    ResultRemoved(ResultId),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    results: Vec<OptimizedResult>,
    status: Option<ProcessingStatus>,
    next_id: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            status: None,
            next_id: 1,
        }
    }

    /// Applies one transition and returns the resulting state.
    pub fn apply(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::FileStarted {
                file_name,
                declared_format,
            } => {
                self.status = Some(ProcessingStatus {
                    file_name,
                    declared_format,
                    progress_percent: 0,
                });
            }
            SessionEvent::ProgressUpdated(percent) => {
                if let Some(status) = self.status.as_mut() {
                    status.progress_percent = percent.min(100);
                }
            }
            SessionEvent::ResultAdded(draft) => {
                let id = ResultId(self.next_id);
                self.next_id += 1;
                self.results.push(OptimizedResult::from_draft(id, draft));
            }
            SessionEvent::BatchFinished => {
                self.status = None;
            }
            SessionEvent::ResultRemoved(id) => {
                self.results.retain(|r| r.id != id);
            }
        }
        self
    }

    pub fn results(&self) -> &[OptimizedResult] {
        &self.results
    }

    pub fn status(&self) -> Option<&ProcessingStatus> {
        self.status.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.status.is_some()
    }

    pub fn get(&self, id: ResultId) -> Option<&OptimizedResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// Deletes one result, releasing its bytes.
    pub fn remove_result(self, id: ResultId) -> Result<Self> {
        if self.get(id).is_none() {
            return Err(CompressionError::ResultNotFound(id));
        }
        Ok(self.apply(SessionEvent::ResultRemoved(id)))
    }

    /// Drops every result. Ids keep increasing across a clear.
    pub fn clear(mut self) -> Self {
        self.results.clear();
        self.status = None;
        self
    }

    /// Overall size reduction across all held results, recomputed per call.
    pub fn aggregate_reduction_percent(&self) -> i64 {
        aggregate_reduction_percent(&self.results)
    }
}
