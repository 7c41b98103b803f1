use thiserror::Error;

use crate::decode::FileKind;

/// Failure modes surfaced by the decode/profile/plan pipeline.
///
/// Decode-time failures always propagate to the caller. Downstream I/O
/// failures (re-fetching an already-accepted file) never appear here; the
/// orchestration layer in [`crate::analyze`] degrades to heuristic output
/// instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported file type '{extension}': expected csv, xls, xlsx, or json")]
    UnsupportedFormat { extension: String },
    #[error("file contains no header or data")]
    EmptyFile,
    #[error("malformed {kind} input: {reason}")]
    MalformedInput { kind: FileKind, reason: String },
    #[error("at least 2 columns must be selected for charting, got {selected}")]
    InsufficientColumns { selected: usize },
    #[error("column '{name}' does not exist in the dataset")]
    ColumnNotFound { name: String },
}

impl PipelineError {
    pub(crate) fn malformed(kind: FileKind, reason: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            kind,
            reason: reason.into(),
        }
    }
}
