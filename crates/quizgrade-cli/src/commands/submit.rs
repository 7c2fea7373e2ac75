//! The `quizgrade submit` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use quizgrade_core::answer::load_answer_sheet;
use quizgrade_core::attempt::AttemptRecord;
use quizgrade_store::{
    load_config_from, DirectoryQuestionStore, JsonlAttemptStore, Submission, SubmissionService,
};

pub async fn execute(
    quiz_id: Option<String>,
    student: Option<String>,
    answers: Option<PathBuf>,
    started_at: Option<String>,
    batch: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(
        quiz_dir = %config.quiz_dir.display(),
        attempts_path = %config.attempts_path.display(),
        "submitting"
    );

    let questions = Arc::new(DirectoryQuestionStore::open(&config.quiz_dir)?);
    let attempts = Arc::new(JsonlAttemptStore::new(&config.attempts_path));
    let service = SubmissionService::new(questions, attempts).with_parallelism(config.parallelism);

    if let Some(batch_path) = batch {
        return submit_batch(&service, batch_path).await;
    }

    let (Some(quiz_id), Some(student_id), Some(answers_path)) = (quiz_id, student, answers) else {
        anyhow::bail!("--quiz-id, --student and --answers are required without --batch");
    };

    let started_at = started_at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("invalid --started-at timestamp: {s}"))
        })
        .transpose()?;

    let submission = Submission {
        quiz_id,
        student_id,
        answers: load_answer_sheet(&answers_path)?,
        started_at,
    };

    let record = service.submit(&submission).await?;
    print_record(&record);
    eprintln!("Attempt appended to: {}", config.attempts_path.display());

    Ok(())
}

async fn submit_batch(service: &SubmissionService, batch_path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&batch_path)
        .with_context(|| format!("failed to read batch: {}", batch_path.display()))?;
    let submissions: Vec<Submission> =
        serde_json::from_str(&content).context("failed to parse batch JSON")?;
    let total = submissions.len();

    let outcomes = service.submit_batch(submissions).await;

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(record) => print_record(record),
            Err(e) => {
                failed += 1;
                println!(
                    "{} on {}: failed: {e:#}",
                    outcome.student_id, outcome.quiz_id
                );
            }
        }
    }

    println!("\n{} of {total} submission(s) recorded.", total - failed);
    if failed > 0 {
        anyhow::bail!("{failed} submission(s) failed");
    }

    Ok(())
}

fn print_record(record: &AttemptRecord) {
    println!(
        "{} on {}: {}/{} ({}%) {} [attempt {}]",
        record.student_id,
        record.quiz_id,
        record.score,
        record.total_points,
        record.percentage,
        if record.passed { "PASSED" } else { "FAILED" },
        record.id
    );
}
