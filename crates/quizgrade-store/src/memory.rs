//! In-memory stores for tests and embedding.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizgrade_core::attempt::AttemptRecord;
use quizgrade_core::model::{Question, Quiz, QuizConfig};
use quizgrade_core::traits::{sort_by_order_index, AttemptStore, QuestionStore};

use crate::error::StoreError;

/// Holds quizzes and appended attempts in memory.
///
/// Implements both store traits, so a single instance can back a
/// [`SubmissionService`](crate::SubmissionService) on both sides.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    quizzes: RwLock<BTreeMap<String, Quiz>>,
    attempts: RwLock<Vec<AttemptRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with quizzes. Later quizzes replace earlier
    /// ones with the same id.
    pub fn with_quizzes(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        let quizzes = quizzes
            .into_iter()
            .map(|quiz| (quiz.config.id.clone(), quiz))
            .collect();
        Self {
            quizzes: RwLock::new(quizzes),
            attempts: RwLock::new(Vec::new()),
        }
    }

    /// Insert or replace a quiz.
    pub async fn add_quiz(&self, quiz: Quiz) {
        self.quizzes
            .write()
            .await
            .insert(quiz.config.id.clone(), quiz);
    }

    /// Number of attempts appended so far.
    pub async fn attempt_count(&self) -> usize {
        self.attempts.read().await.len()
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn quiz(&self, quiz_id: &str) -> anyhow::Result<Option<QuizConfig>> {
        Ok(self
            .quizzes
            .read()
            .await
            .get(quiz_id)
            .map(|quiz| quiz.config.clone()))
    }

    async fn questions_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        let quizzes = self.quizzes.read().await;
        let quiz = quizzes
            .get(quiz_id)
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()))?;
        let mut questions = quiz.questions.clone();
        sort_by_order_index(&mut questions);
        Ok(questions)
    }
}

#[async_trait]
impl AttemptStore for InMemoryStore {
    async fn append_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        self.attempts.write().await.push(record.clone());
        Ok(())
    }

    async fn attempts_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<AttemptRecord>> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .filter(|r| r.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn attempts_for_student(&self, student_id: &str) -> anyhow::Result<Vec<AttemptRecord>> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn all_attempts(&self) -> anyhow::Result<Vec<AttemptRecord>> {
        Ok(self.attempts.read().await.clone())
    }
}
