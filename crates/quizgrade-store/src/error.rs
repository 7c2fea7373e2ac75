//! Store error types.

use thiserror::Error;

/// Errors raised by the stores and the submission service.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No quiz with this id is known to the question store.
    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    /// The quiz exists but is not open for submissions.
    #[error("quiz is not published: {0}")]
    QuizNotPublished(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line in the attempt log is not a valid attempt record.
    #[error("corrupt attempt record at line {line}: {message}")]
    CorruptRecord { line: usize, message: String },
}
