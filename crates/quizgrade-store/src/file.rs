//! File-backed stores.
//!
//! Quizzes are read from a directory of TOML files. Attempts are appended to
//! a JSON Lines log, one [`AttemptRecord`] per line.

use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use quizgrade_core::attempt::AttemptRecord;
use quizgrade_core::model::{Question, Quiz, QuizConfig};
use quizgrade_core::parser::load_quiz_directory;
use quizgrade_core::traits::{sort_by_order_index, AttemptStore, QuestionStore};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Directory question store
// ---------------------------------------------------------------------------

/// Serves quizzes loaded once from a directory of quiz files.
#[derive(Debug)]
pub struct DirectoryQuestionStore {
    dir: PathBuf,
    quizzes: BTreeMap<String, Quiz>,
}

impl DirectoryQuestionStore {
    /// Load every quiz under `dir`. Files that fail to parse are skipped;
    /// when two files share a quiz id the first one (in path order) wins.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let mut quizzes = BTreeMap::new();

        for quiz in load_quiz_directory(&dir)? {
            let id = quiz.config.id.clone();
            if quizzes.contains_key(&id) {
                tracing::warn!("duplicate quiz id '{id}' in {}, keeping the first", dir.display());
                continue;
            }
            quizzes.insert(id, quiz);
        }

        tracing::debug!("loaded {} quizzes from {}", quizzes.len(), dir.display());
        Ok(Self { dir, quizzes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids of all loaded quizzes, sorted.
    pub fn quiz_ids(&self) -> impl Iterator<Item = &str> {
        self.quizzes.keys().map(String::as_str)
    }
}

#[async_trait]
impl QuestionStore for DirectoryQuestionStore {
    async fn quiz(&self, quiz_id: &str) -> Result<Option<QuizConfig>> {
        Ok(self.quizzes.get(quiz_id).map(|quiz| quiz.config.clone()))
    }

    async fn questions_for_quiz(&self, quiz_id: &str) -> Result<Vec<Question>> {
        let quiz = self
            .quizzes
            .get(quiz_id)
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()))?;
        let mut questions = quiz.questions.clone();
        sort_by_order_index(&mut questions);
        Ok(questions)
    }
}

// ---------------------------------------------------------------------------
// JSON Lines attempt store
// ---------------------------------------------------------------------------

/// Append-only attempt log in JSON Lines format.
#[derive(Debug)]
pub struct JsonlAttemptStore {
    path: PathBuf,
    // Serializes appends so concurrent writers never interleave lines.
    write_lock: Mutex<()>,
}

impl JsonlAttemptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<AttemptRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io(e))
                    .with_context(|| format!("failed to read attempts: {}", self.path.display()))
            }
        };

        parse_attempt_lines(&content)
            .with_context(|| format!("failed to load attempts: {}", self.path.display()))
    }
}

/// Parse a JSON Lines attempt log. Blank lines are skipped.
///
/// A final line with no terminating newline is an interrupted append: if it
/// does not parse it is skipped with a warning. Any other bad line is a
/// [`StoreError::CorruptRecord`].
fn parse_attempt_lines(content: &str) -> Result<Vec<AttemptRecord>, StoreError> {
    let torn_tail = !content.is_empty() && !content.ends_with('\n');
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();
    let last = lines.len().saturating_sub(1);

    let mut records = Vec::with_capacity(lines.len());
    for (pos, (i, line)) in lines.into_iter().enumerate() {
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) if torn_tail && pos == last => {
                tracing::warn!("skipping incomplete attempt record at line {}: {e}", i + 1);
            }
            Err(e) => {
                return Err(StoreError::CorruptRecord {
                    line: i + 1,
                    message: e.to_string(),
                })
            }
        }
    }
    Ok(records)
}

/// Make sure the log ends with a newline before appending to it.
///
/// An unterminated tail that parses is kept and terminated. Otherwise it is
/// left over from an interrupted append and is truncated.
async fn repair_tail(path: &Path) -> Result<(), StoreError> {
    let mut file = match tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    if last[0] == b'\n' {
        return Ok(());
    }

    file.seek(SeekFrom::Start(0)).await?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).await?;
    let keep = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);

    if serde_json::from_slice::<AttemptRecord>(&content[keep..]).is_ok() {
        file.seek(SeekFrom::End(0)).await?;
        file.write_all(b"\n").await?;
    } else {
        tracing::warn!(
            "discarding {} byte(s) of incomplete attempt record at the end of {}",
            content.len() - keep,
            path.display()
        );
        file.set_len(keep as u64).await?;
    }
    file.flush().await?;
    Ok(())
}

#[async_trait]
impl AttemptStore for JsonlAttemptStore {
    async fn append_attempt(&self, record: &AttemptRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("failed to serialize attempt")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::Io)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        repair_tail(&self.path)
            .await
            .with_context(|| format!("failed to repair attempts: {}", self.path.display()))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(StoreError::Io)
            .with_context(|| format!("failed to open attempts: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(StoreError::Io)
            .with_context(|| format!("failed to append attempt: {}", self.path.display()))?;
        file.flush().await.map_err(StoreError::Io)?;

        Ok(())
    }

    async fn attempts_for_quiz(&self, quiz_id: &str) -> Result<Vec<AttemptRecord>> {
        let mut records = self.read_all().await?;
        records.retain(|r| r.quiz_id == quiz_id);
        Ok(records)
    }

    async fn attempts_for_student(&self, student_id: &str) -> Result<Vec<AttemptRecord>> {
        let mut records = self.read_all().await?;
        records.retain(|r| r.student_id == student_id);
        Ok(records)
    }

    async fn all_attempts(&self) -> Result<Vec<AttemptRecord>> {
        self.read_all().await
    }
}
