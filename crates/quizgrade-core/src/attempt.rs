//! Persisted attempt records.
//!
//! The grading engine never reads the clock; an [`AttemptRecord`] is where
//! the caller's timestamps meet the engine's [`AttemptSummary`].

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::results::{AttemptSummary, GradedResult};

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
}

/// One student's finished run through a quiz, as appended to the attempt store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub quiz_id: String,
    pub student_id: String,
    pub score: f64,
    pub total_points: f64,
    pub percentage: u32,
    pub passed: bool,
    pub time_taken_secs: u64,
    /// Per-question breakdown.
    pub answers: Vec<GradedResult>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    pub status: AttemptStatus,
}

impl AttemptRecord {
    /// Build a completed record from a graded summary.
    pub fn from_summary(
        summary: AttemptSummary,
        quiz_id: impl Into<String>,
        student_id: impl Into<String>,
        started_at: Option<DateTime<Utc>>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let time_taken_secs = started_at
            .map(|start| (completed_at - start).num_seconds().max(0) as u64)
            .unwrap_or(0);

        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            student_id: student_id.into(),
            score: summary.score,
            total_points: summary.total_points,
            percentage: summary.percentage,
            passed: summary.passed,
            time_taken_secs,
            answers: summary.results,
            started_at,
            completed_at,
            status: AttemptStatus::Completed,
        }
    }

    /// Unrounded score as a percentage of the total.
    pub fn exact_percentage(&self) -> f64 {
        if self.total_points > 0.0 {
            self.score / self.total_points * 100.0
        } else {
            0.0
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }

    /// Save the record as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize attempt")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write attempt to {}", path.display()))?;
        Ok(())
    }

    /// Load a record saved with [`AttemptRecord::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        let record: AttemptRecord =
            serde_json::from_str(&content).context("failed to parse attempt JSON")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn summary(score: f64, total: f64) -> AttemptSummary {
        AttemptSummary {
            score,
            total_points: total,
            percentage: (score / total * 100.0).round() as u32,
            passed: true,
            results: vec![],
        }
    }

    #[test]
    fn time_taken_comes_from_caller_timestamps() {
        let completed = Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 0).unwrap();
        let started = completed - Duration::seconds(754);

        let record = AttemptRecord::from_summary(summary(3.0, 4.0), "quiz", "stu", Some(started), completed);
        assert_eq!(record.time_taken_secs, 754);
        assert_eq!(record.percentage, 75);
        assert!(record.is_completed());

        let untimed = AttemptRecord::from_summary(summary(3.0, 4.0), "quiz", "stu", None, completed);
        assert_eq!(untimed.time_taken_secs, 0);
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let completed = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let started = completed + Duration::seconds(30);
        let record = AttemptRecord::from_summary(summary(1.0, 1.0), "q", "s", Some(started), completed);
        assert_eq!(record.time_taken_secs, 0);
    }

    #[test]
    fn exact_percentage_is_unrounded() {
        let completed = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let record = AttemptRecord::from_summary(summary(2.0, 3.0), "q", "s", None, completed);
        assert_eq!(record.percentage, 67);
        assert!((record.exact_percentage() - 66.666).abs() < 0.01);
    }

    #[test]
    fn json_roundtrip() {
        let completed = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let record = AttemptRecord::from_summary(summary(1.0, 2.0), "q", "s", None, completed);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("attempt.json");
        record.save_json(&path).unwrap();

        let loaded = AttemptRecord::load_json(&path).unwrap();
        assert_eq!(loaded, record);
    }
}
