//! Core data model types for quizgrade.
//!
//! A [`Question`] is always valid for its type: the per-type data lives in
//! [`QuestionKind`], so a multiple choice question without options cannot be
//! constructed. The flat persisted shape is [`QuestionRecord`]; `Question`
//! serializes through it and rejects records that break the invariant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GradeError;

/// The six supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    MatchFollowing,
    ShortAnswer,
    LongAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FillInBlank,
        QuestionType::MatchFollowing,
        QuestionType::ShortAnswer,
        QuestionType::LongAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::MatchFollowing => "match_following",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::LongAnswer => "long_answer",
        }
    }

    /// Name of the record field that carries this type's answer data.
    fn data_field(&self) -> Option<&'static str> {
        match self {
            QuestionType::MultipleChoice => Some("options"),
            QuestionType::FillInBlank => Some("blanks"),
            QuestionType::MatchFollowing => Some("match_pairs"),
            QuestionType::TrueFalse | QuestionType::ShortAnswer | QuestionType::LongAnswer => None,
        }
    }

    /// Free-text types are only checked for presence and need a human grader.
    pub fn needs_manual_review(&self) -> bool {
        matches!(self, QuestionType::ShortAnswer | QuestionType::LongAnswer)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown question type: {s}"))
    }
}

/// One left/right pair of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// Type-specific answer data.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    TrueFalse,
    FillInBlank { blanks: Vec<String> },
    MatchFollowing { pairs: Vec<MatchPair> },
    ShortAnswer,
    LongAnswer,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TrueFalse => QuestionType::TrueFalse,
            QuestionKind::FillInBlank { .. } => QuestionType::FillInBlank,
            QuestionKind::MatchFollowing { .. } => QuestionType::MatchFollowing,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
            QuestionKind::LongAnswer => QuestionType::LongAnswer,
        }
    }
}

/// One assessable item belonging to a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub question_text: String,
    pub kind: QuestionKind,
    /// Literal answer for multiple choice and true/false, reference text otherwise.
    pub correct_answer: String,
    /// Maximum achievable score. Always finite and positive.
    pub points: f64,
    pub difficulty: Option<String>,
    pub explanation: Option<String>,
    pub order_index: u32,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Check the value-level invariants that the type system cannot express.
    ///
    /// An empty match pair list is allowed; it grades to zero.
    pub fn validate(&self) -> Result<(), GradeError> {
        if !self.points.is_finite() || self.points <= 0.0 {
            return Err(GradeError::malformed(
                &self.id,
                format!("points must be a positive number, got {}", self.points),
            ));
        }

        match &self.kind {
            QuestionKind::MultipleChoice { options } => {
                if options.is_empty() {
                    return Err(GradeError::malformed(&self.id, "options must not be empty"));
                }
                if !options.contains(&self.correct_answer) {
                    return Err(GradeError::malformed(
                        &self.id,
                        format!(
                            "correct answer '{}' is not one of the options",
                            self.correct_answer
                        ),
                    ));
                }
            }
            QuestionKind::TrueFalse => {
                if self.correct_answer != "true" && self.correct_answer != "false" {
                    return Err(GradeError::malformed(
                        &self.id,
                        format!(
                            "true_false answer must be \"true\" or \"false\", got '{}'",
                            self.correct_answer
                        ),
                    ));
                }
            }
            QuestionKind::FillInBlank { blanks } => {
                if blanks.is_empty() {
                    return Err(GradeError::malformed(&self.id, "blanks must not be empty"));
                }
            }
            QuestionKind::MatchFollowing { .. }
            | QuestionKind::ShortAnswer
            | QuestionKind::LongAnswer => {}
        }

        Ok(())
    }
}

/// The flat persisted shape of a question.
///
/// Exactly one of `options`, `blanks` and `match_pairs` is expected to be
/// populated, chosen by `question_type`. Converting into a [`Question`]
/// enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub question_text: String,
    pub question_type: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub blanks: Option<Vec<String>>,
    #[serde(default)]
    pub match_pairs: Option<Vec<MatchPair>>,
    pub points: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub order_index: Option<u32>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = GradeError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let QuestionRecord {
            id,
            quiz_id,
            question_text,
            question_type,
            difficulty,
            correct_answer,
            options,
            blanks,
            match_pairs,
            points,
            explanation,
            order_index,
        } = record;

        let question_type: QuestionType =
            question_type
                .parse()
                .map_err(|_| GradeError::UnknownQuestionType {
                    question_id: id.clone(),
                    question_type: question_type.clone(),
                })?;

        let populated = [
            ("options", options.is_some()),
            ("blanks", blanks.is_some()),
            ("match_pairs", match_pairs.is_some()),
        ];
        for (field, present) in populated {
            if present && question_type.data_field() != Some(field) {
                return Err(GradeError::malformed(
                    &id,
                    format!("{field} must be null for {question_type}"),
                ));
            }
        }

        let missing = |field: &str| {
            GradeError::malformed(&id, format!("{question_type} requires {field}"))
        };

        let kind = match question_type {
            QuestionType::MultipleChoice => QuestionKind::MultipleChoice {
                options: options.ok_or_else(|| missing("options"))?,
            },
            QuestionType::TrueFalse => QuestionKind::TrueFalse,
            QuestionType::FillInBlank => QuestionKind::FillInBlank {
                blanks: blanks.ok_or_else(|| missing("blanks"))?,
            },
            QuestionType::MatchFollowing => QuestionKind::MatchFollowing {
                pairs: match_pairs.ok_or_else(|| missing("match_pairs"))?,
            },
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer,
            QuestionType::LongAnswer => QuestionKind::LongAnswer,
        };

        let question = Question {
            id,
            quiz_id,
            question_text,
            kind,
            correct_answer: correct_answer.unwrap_or_default(),
            points,
            difficulty,
            explanation,
            order_index: order_index.unwrap_or(0),
        };
        question.validate()?;
        Ok(question)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        let question_type = question.question_type().to_string();
        let (options, blanks, match_pairs) = match question.kind {
            QuestionKind::MultipleChoice { options } => (Some(options), None, None),
            QuestionKind::FillInBlank { blanks } => (None, Some(blanks), None),
            QuestionKind::MatchFollowing { pairs } => (None, None, Some(pairs)),
            QuestionKind::TrueFalse | QuestionKind::ShortAnswer | QuestionKind::LongAnswer => {
                (None, None, None)
            }
        };

        QuestionRecord {
            id: question.id,
            quiz_id: question.quiz_id,
            question_text: question.question_text,
            question_type,
            difficulty: question.difficulty,
            correct_answer: Some(question.correct_answer),
            options,
            blanks,
            match_pairs,
            points: question.points,
            explanation: question.explanation,
            order_index: Some(question.order_index),
        }
    }
}

/// Per-quiz settings supplied by the teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Advisory time limit; enforced by callers, never by the grader.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Percentage (0-100) an attempt must reach to pass.
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    /// Only published quizzes accept submissions.
    #[serde(default)]
    pub is_published: bool,
}

fn default_duration() -> u32 {
    30
}

fn default_passing_score() -> f64 {
    60.0
}

/// A quiz and its questions, ordered by `order_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub config: QuizConfig,
    pub questions: Vec<Question>,
}
