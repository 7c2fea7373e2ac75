//! Submission service.
//!
//! Composes a [`QuestionStore`], the grading engine, and an [`AttemptStore`]:
//! fetch the quiz, grade the answers, stamp the record, append it.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::info;

use quizgrade_core::answer::{deserialize_answer_sheet, AnswerSheet};
use quizgrade_core::attempt::AttemptRecord;
use quizgrade_core::grading::grade;
use quizgrade_core::traits::{AttemptStore, QuestionStore};

use crate::error::StoreError;

/// One student's answers to one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub quiz_id: String,
    pub student_id: String,
    /// Null answers are treated as not answered.
    #[serde(deserialize_with = "deserialize_answer_sheet")]
    pub answers: AnswerSheet,
    /// When the student started, if known. Used for `time_taken_secs`.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// Outcome of one submission within a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position of the submission in the input batch.
    pub index: usize,
    pub quiz_id: String,
    pub student_id: String,
    pub result: Result<AttemptRecord>,
}

/// Grades submissions and persists the resulting attempts.
pub struct SubmissionService {
    questions: Arc<dyn QuestionStore>,
    attempts: Arc<dyn AttemptStore>,
    parallelism: usize,
}

impl SubmissionService {
    pub fn new(questions: Arc<dyn QuestionStore>, attempts: Arc<dyn AttemptStore>) -> Self {
        Self {
            questions,
            attempts,
            parallelism: 4,
        }
    }

    /// Bound the number of submissions graded concurrently by
    /// [`submit_batch`](Self::submit_batch). Values below 1 are treated as 1.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Grade and persist a submission, completing it now.
    pub async fn submit(&self, submission: &Submission) -> Result<AttemptRecord> {
        self.submit_at(submission, Utc::now()).await
    }

    /// Grade and persist a submission with an explicit completion time.
    pub async fn submit_at(
        &self,
        submission: &Submission,
        completed_at: DateTime<Utc>,
    ) -> Result<AttemptRecord> {
        let quiz_id = submission.quiz_id.as_str();
        let config = self
            .questions
            .quiz(quiz_id)
            .await?
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()))?;
        if !config.is_published {
            return Err(StoreError::QuizNotPublished(quiz_id.to_string()).into());
        }
        let questions = self.questions.questions_for_quiz(quiz_id).await?;

        let summary = grade(&questions, &submission.answers, config.passing_score)
            .with_context(|| format!("failed to grade submission for quiz '{quiz_id}'"))?;

        let record = AttemptRecord::from_summary(
            summary,
            quiz_id,
            submission.student_id.as_str(),
            submission.started_at,
            completed_at,
        );
        self.attempts
            .append_attempt(&record)
            .await
            .context("failed to persist attempt")?;

        info!(
            attempt_id = %record.id,
            quiz_id,
            student_id = %record.student_id,
            percentage = record.percentage,
            passed = record.passed,
            "attempt recorded"
        );

        Ok(record)
    }

    /// Grade many submissions concurrently, at most `parallelism` at a time.
    ///
    /// A failing submission does not affect the others. Outcomes are returned
    /// in input order.
    pub async fn submit_batch(&self, submissions: Vec<Submission>) -> Vec<BatchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut futures = FuturesUnordered::new();

        for (index, submission) in submissions.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let result = async {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    self.submit(&submission).await
                }
                .await;
                BatchOutcome {
                    index,
                    quiz_id: submission.quiz_id,
                    student_id: submission.student_id,
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(futures.len());
        while let Some(outcome) = futures.next().await {
            if let Err(e) = &outcome.result {
                tracing::error!(
                    "submission {} for {}/{} failed: {e:#}",
                    outcome.index,
                    outcome.quiz_id,
                    outcome.student_id
                );
            }
            outcomes.push(outcome);
        }

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }
}
