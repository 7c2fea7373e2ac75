//! quizgrade-core — Question model, grading engine, and attempt statistics.
//!
//! This crate defines the quiz data model, the pure grading function, quiz
//! file parsing, and the store traits that the rest of quizgrade builds on.

pub mod answer;
pub mod attempt;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod results;
pub mod statistics;
pub mod traits;

pub use answer::{AnswerSheet, SubmittedAnswer};
pub use error::GradeError;
pub use grading::{grade, grade_question, grade_records};
pub use model::{Question, QuestionKind, QuestionType, Quiz, QuizConfig};
pub use results::{AttemptSummary, GradedResult};
