//! The grading engine.
//!
//! [`grade`] is a pure, deterministic function of its inputs: it performs no
//! I/O, reads no clock, and holds no state, so any number of callers may run
//! it concurrently. Each question is graded independently by the rule for its
//! type:
//!
//! | Type | Correct when | Points |
//! |---|---|---|
//! | multiple choice, true/false | answer equals `correct_answer` exactly | all or nothing |
//! | fill in blank | every blank matches, trimmed and case-insensitive | all or nothing |
//! | match following | every pair matches | `points * matched / pairs` |
//! | short/long answer | answer is non-blank | all or nothing, flagged for review |

use tracing::debug;

use crate::answer::{AnswerSheet, SubmittedAnswer};
use crate::error::GradeError;
use crate::model::{MatchPair, Question, QuestionKind, QuestionRecord};
use crate::results::{AttemptSummary, GradedResult};

/// Fraction of a question's points awarded, and whether it counts as correct.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Credit {
    fraction: f64,
    is_correct: bool,
}

impl Credit {
    const NONE: Credit = Credit {
        fraction: 0.0,
        is_correct: false,
    };

    fn all_or_nothing(correct: bool) -> Self {
        if correct {
            Credit {
                fraction: 1.0,
                is_correct: true,
            }
        } else {
            Credit::NONE
        }
    }
}

/// Grade an attempt.
///
/// Questions missing from `answers` earn zero points. Fails fast on an empty
/// question set, a passing score outside `0..=100`, or any question that
/// violates its type's invariants.
pub fn grade(
    questions: &[Question],
    answers: &AnswerSheet,
    passing_score: f64,
) -> Result<AttemptSummary, GradeError> {
    if questions.is_empty() {
        return Err(GradeError::EmptyQuestionSet);
    }
    if !passing_score.is_finite() || !(0.0..=100.0).contains(&passing_score) {
        return Err(GradeError::InvalidPassingScore(passing_score));
    }
    for question in questions {
        question.validate()?;
    }

    let results: Vec<GradedResult> = questions
        .iter()
        .map(|q| grade_question(q, answers.get(&q.id)))
        .collect();

    let total_points: f64 = results.iter().map(|r| r.points_possible).sum();
    let score: f64 = results.iter().map(|r| r.points_earned).sum();
    // total_points > 0: every question was validated to carry positive points
    let percentage = ((score / total_points) * 100.0).round() as u32;
    let passed = f64::from(percentage) >= passing_score;

    Ok(AttemptSummary {
        score,
        total_points,
        percentage,
        passed,
        results,
    })
}

/// Convert persisted records and grade them.
///
/// Any record with an unknown type tag or a field layout that does not match
/// its type fails the whole grade.
pub fn grade_records(
    records: &[QuestionRecord],
    answers: &AnswerSheet,
    passing_score: f64,
) -> Result<AttemptSummary, GradeError> {
    let questions = records
        .iter()
        .cloned()
        .map(Question::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    grade(&questions, answers, passing_score)
}

/// Grade a single question against an optional submitted answer.
pub fn grade_question(question: &Question, answer: Option<&SubmittedAnswer>) -> GradedResult {
    let credit = match &question.kind {
        QuestionKind::MultipleChoice { .. } | QuestionKind::TrueFalse => {
            let submitted = text_answer(question, answer);
            Credit::all_or_nothing(submitted == Some(question.correct_answer.as_str()))
        }
        QuestionKind::FillInBlank { blanks } => grade_blanks(blanks, list_answer(question, answer)),
        QuestionKind::MatchFollowing { pairs } => {
            let submitted = answer.and_then(|a| {
                let mapping = a.as_mapping();
                if mapping.is_none() {
                    log_shape_mismatch(question, a);
                }
                mapping
            });
            grade_matches(pairs, submitted)
        }
        QuestionKind::ShortAnswer | QuestionKind::LongAnswer => {
            let submitted = text_answer(question, answer);
            Credit::all_or_nothing(submitted.is_some_and(|s| !s.trim().is_empty()))
        }
    };

    let question_type = question.question_type();
    debug!(
        question_id = %question.id,
        %question_type,
        fraction = credit.fraction,
        is_correct = credit.is_correct,
        "graded question"
    );

    GradedResult {
        question_id: question.id.clone(),
        question_type,
        student_answer: answer.cloned(),
        correct_answer: question.correct_answer.clone(),
        is_correct: credit.is_correct,
        points_earned: credit.fraction * question.points,
        points_possible: question.points,
        needs_review: question_type.needs_manual_review(),
    }
}

/// Normalize a blank for comparison: trimmed and lower-cased.
pub fn normalize_blank(s: &str) -> String {
    s.trim().to_lowercase()
}

fn grade_blanks(blanks: &[String], submitted: Option<&[Option<String>]>) -> Credit {
    let Some(submitted) = submitted else {
        return Credit::NONE;
    };
    // Extra submitted entries beyond the expected blanks are ignored.
    let all_match = blanks.iter().enumerate().all(|(i, blank)| {
        submitted
            .get(i)
            .and_then(|s| s.as_deref())
            .is_some_and(|s| normalize_blank(s) == normalize_blank(blank))
    });
    Credit::all_or_nothing(all_match)
}

fn grade_matches(
    pairs: &[MatchPair],
    submitted: Option<&std::collections::BTreeMap<String, Option<String>>>,
) -> Credit {
    // No pairs means nothing to earn; guards the division below.
    if pairs.is_empty() {
        return Credit::NONE;
    }
    let Some(submitted) = submitted else {
        return Credit::NONE;
    };

    let matched = pairs
        .iter()
        .filter(|pair| submitted.get(&pair.left).and_then(|r| r.as_ref()) == Some(&pair.right))
        .count();

    Credit {
        fraction: matched as f64 / pairs.len() as f64,
        is_correct: matched == pairs.len(),
    }
}

fn text_answer<'a>(question: &Question, answer: Option<&'a SubmittedAnswer>) -> Option<&'a str> {
    let answer = answer?;
    let text = answer.as_text();
    if text.is_none() {
        log_shape_mismatch(question, answer);
    }
    text
}

fn list_answer<'a>(
    question: &Question,
    answer: Option<&'a SubmittedAnswer>,
) -> Option<&'a [Option<String>]> {
    let answer = answer?;
    let list = answer.as_list();
    if list.is_none() {
        log_shape_mismatch(question, answer);
    }
    list
}

fn log_shape_mismatch(question: &Question, answer: &SubmittedAnswer) {
    debug!(
        question_id = %question.id,
        question_type = %question.question_type(),
        shape = answer.shape(),
        "submitted answer shape does not fit the question type, grading as unanswered"
    );
}
