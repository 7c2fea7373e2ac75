//! Grading output types.

use serde::{Deserialize, Serialize};

use crate::answer::SubmittedAnswer;
use crate::model::QuestionType;

/// Outcome for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedResult {
    pub question_id: String,
    pub question_type: QuestionType,
    /// The answer exactly as submitted; `None` when the student skipped it.
    pub student_answer: Option<SubmittedAnswer>,
    /// Echoed from the question.
    pub correct_answer: String,
    /// For matching questions, true only when every pair matched.
    pub is_correct: bool,
    /// Fractional for partially matched matching questions.
    pub points_earned: f64,
    pub points_possible: f64,
    /// Set for free-text answers, which are only checked for presence.
    #[serde(default)]
    pub needs_review: bool,
}

/// Aggregate over all graded questions of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    /// Sum of points earned; may be fractional.
    pub score: f64,
    pub total_points: f64,
    /// `round(score / total_points * 100)`.
    pub percentage: u32,
    /// `percentage >= passing_score`.
    pub passed: bool,
    pub results: Vec<GradedResult>,
}

impl AttemptSummary {
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }

    pub fn needs_review(&self) -> bool {
        self.results.iter().any(|r| r.needs_review)
    }
}
