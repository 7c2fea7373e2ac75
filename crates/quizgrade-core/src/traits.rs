//! Store traits the grading workflow depends on.
//!
//! The engine itself never touches storage. Callers fetch questions through a
//! [`QuestionStore`], grade them, and hand the resulting record to an
//! [`AttemptStore`]. Implementations live in `quizgrade-store`.

use async_trait::async_trait;

use crate::attempt::AttemptRecord;
use crate::model::{Question, QuizConfig};

// ---------------------------------------------------------------------------
// Question store
// ---------------------------------------------------------------------------

/// Read access to quizzes and their questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Look up a quiz's configuration.
    async fn quiz(&self, quiz_id: &str) -> anyhow::Result<Option<QuizConfig>>;

    /// All questions of a quiz, ordered by `order_index`.
    async fn questions_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>>;
}

// ---------------------------------------------------------------------------
// Attempt store
// ---------------------------------------------------------------------------

/// Append-only storage for graded attempts.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn append_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()>;

    async fn attempts_for_quiz(&self, quiz_id: &str) -> anyhow::Result<Vec<AttemptRecord>>;

    async fn attempts_for_student(&self, student_id: &str) -> anyhow::Result<Vec<AttemptRecord>>;

    async fn all_attempts(&self) -> anyhow::Result<Vec<AttemptRecord>>;
}

/// Sort questions into presentation order, keeping file order for ties.
pub fn sort_by_order_index(questions: &mut [Question]) {
    questions.sort_by_key(|q| q.order_index);
}
