//! Grading error types.
//!
//! Every failure the engine can report is detected synchronously from its
//! inputs. Callers match on [`GradeError::kind`] to decide whether to reject
//! the submission or ask for corrected quiz data.

use thiserror::Error;

/// Errors produced while validating questions or grading an attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// The quiz has no questions to grade.
    #[error("question set is empty")]
    EmptyQuestionSet,

    /// A question's populated fields do not match its declared type.
    #[error("malformed question {question_id}: {reason}")]
    MalformedQuestion { question_id: String, reason: String },

    /// A persisted record carries a type tag outside the six known types.
    #[error("unknown question type '{question_type}' on question {question_id}")]
    UnknownQuestionType {
        question_id: String,
        question_type: String,
    },

    /// The pass threshold is not a percentage.
    #[error("passing score {0} is outside 0..=100")]
    InvalidPassingScore(f64),
}

/// Fieldless category of a [`GradeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyQuestionSet,
    MalformedQuestion,
    UnknownQuestionType,
    InvalidPassingScore,
}

impl GradeError {
    pub(crate) fn malformed(question_id: &str, reason: impl Into<String>) -> Self {
        GradeError::MalformedQuestion {
            question_id: question_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GradeError::EmptyQuestionSet => ErrorKind::EmptyQuestionSet,
            GradeError::MalformedQuestion { .. } => ErrorKind::MalformedQuestion,
            GradeError::UnknownQuestionType { .. } => ErrorKind::UnknownQuestionType,
            GradeError::InvalidPassingScore(_) => ErrorKind::InvalidPassingScore,
        }
    }

    /// Returns `true` if the quiz definition itself is broken, as opposed to
    /// the grading request.
    pub fn is_quiz_defect(&self) -> bool {
        matches!(
            self,
            GradeError::MalformedQuestion { .. } | GradeError::UnknownQuestionType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(GradeError::EmptyQuestionSet.kind(), ErrorKind::EmptyQuestionSet);
        assert_eq!(
            GradeError::malformed("q1", "no options").kind(),
            ErrorKind::MalformedQuestion
        );
        assert_eq!(
            GradeError::InvalidPassingScore(120.0).kind(),
            ErrorKind::InvalidPassingScore
        );
    }

    #[test]
    fn display_names_the_question() {
        let err = GradeError::UnknownQuestionType {
            question_id: "q7".into(),
            question_type: "essay".into(),
        };
        assert_eq!(err.to_string(), "unknown question type 'essay' on question q7");
        assert!(err.is_quiz_defect());
        assert!(!GradeError::EmptyQuestionSet.is_quiz_defect());
    }
}
