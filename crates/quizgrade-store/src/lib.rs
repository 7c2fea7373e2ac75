//! quizgrade-store — Question and attempt stores, configuration, and the
//! submission service.
//!
//! Implements the `QuestionStore` and `AttemptStore` traits from
//! `quizgrade-core` in memory and on disk, and composes them with the
//! grading engine into [`SubmissionService`].

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod service;

pub use config::{load_config, load_config_from, QuizgradeConfig};
pub use error::StoreError;
pub use file::{DirectoryQuestionStore, JsonlAttemptStore};
pub use memory::InMemoryStore;
pub use service::{BatchOutcome, Submission, SubmissionService};
