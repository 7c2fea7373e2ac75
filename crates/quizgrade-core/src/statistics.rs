//! Aggregate statistics over completed attempts.
//!
//! Only records with [`AttemptStatus::Completed`](crate::attempt::AttemptStatus)
//! are counted. All outputs use ordered maps or explicitly sorted vectors so
//! repeated runs print identically.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attempt::AttemptRecord;

/// A student's history on one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttemptStats {
    pub attempts: usize,
    /// Best unrounded `score / total_points * 100`.
    pub best_percentage: f64,
    pub last_completed_at: DateTime<Utc>,
}

/// Per-quiz history for one student, keyed by quiz id.
pub fn quiz_stats_for_student(
    records: &[AttemptRecord],
    student_id: &str,
) -> BTreeMap<String, QuizAttemptStats> {
    let mut stats: BTreeMap<String, QuizAttemptStats> = BTreeMap::new();

    for record in completed(records).filter(|r| r.student_id == student_id) {
        let entry = stats
            .entry(record.quiz_id.clone())
            .or_insert_with(|| QuizAttemptStats {
                attempts: 0,
                best_percentage: 0.0,
                last_completed_at: record.completed_at,
            });
        entry.attempts += 1;
        entry.best_percentage = entry.best_percentage.max(record.exact_percentage());
        if record.completed_at > entry.last_completed_at {
            entry.last_completed_at = record.completed_at;
        }
    }

    stats
}

/// One row of the student leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub student_id: String,
    /// Rounded mean of the student's attempt percentages.
    pub average_percentage: u32,
    pub best_percentage: u32,
    pub total_attempts: usize,
}

/// Rank students by average percentage, highest first. Ties break on
/// student id.
pub fn leaderboard(records: &[AttemptRecord]) -> Vec<LeaderboardEntry> {
    let mut per_student: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for record in completed(records) {
        per_student
            .entry(record.student_id.as_str())
            .or_default()
            .push(record.percentage);
    }

    let mut entries: Vec<LeaderboardEntry> = per_student
        .into_iter()
        .map(|(student_id, percentages)| LeaderboardEntry {
            student_id: student_id.to_string(),
            average_percentage: mean(&percentages).round() as u32,
            best_percentage: percentages.iter().copied().max().unwrap_or(0),
            total_attempts: percentages.len(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.average_percentage
            .cmp(&a.average_percentage)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    entries
}

/// Teacher-facing summary across a set of attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_attempts: usize,
    /// Mean percentage, one decimal place.
    pub average_percentage: f64,
    /// Share of passed attempts in percent, one decimal place.
    pub pass_rate: f64,
    pub unique_students: usize,
    pub per_quiz: Vec<QuizPerformance>,
}

/// How one quiz performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPerformance {
    pub quiz_id: String,
    pub attempts: usize,
    pub average_percentage: u32,
    pub passed: usize,
}

/// Compute teacher analytics. Empty input yields zeroes, never NaN.
pub fn analytics(records: &[AttemptRecord]) -> Analytics {
    let done: Vec<&AttemptRecord> = completed(records).collect();
    let total_attempts = done.len();

    let percentages: Vec<u32> = done.iter().map(|r| r.percentage).collect();
    let passed = done.iter().filter(|r| r.passed).count();
    let pass_rate = if total_attempts > 0 {
        round_one_decimal(passed as f64 / total_attempts as f64 * 100.0)
    } else {
        0.0
    };
    let unique_students = done
        .iter()
        .map(|r| r.student_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut per_quiz: BTreeMap<&str, Vec<&AttemptRecord>> = BTreeMap::new();
    for &record in &done {
        per_quiz.entry(record.quiz_id.as_str()).or_default().push(record);
    }
    let per_quiz = per_quiz
        .into_iter()
        .map(|(quiz_id, attempts)| {
            let percentages: Vec<u32> = attempts.iter().map(|r| r.percentage).collect();
            QuizPerformance {
                quiz_id: quiz_id.to_string(),
                attempts: attempts.len(),
                average_percentage: mean(&percentages).round() as u32,
                passed: attempts.iter().filter(|r| r.passed).count(),
            }
        })
        .collect();

    Analytics {
        total_attempts,
        average_percentage: round_one_decimal(mean(&percentages)),
        pass_rate,
        unique_students,
        per_quiz,
    }
}

fn completed(records: &[AttemptRecord]) -> impl Iterator<Item = &AttemptRecord> {
    records.iter().filter(|r| r.is_completed())
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
