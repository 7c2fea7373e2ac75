//! The `quizgrade stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizgrade_core::statistics::{analytics, quiz_stats_for_student};
use quizgrade_core::traits::AttemptStore;
use quizgrade_store::{load_config_from, JsonlAttemptStore};

use super::Format;

pub async fn execute(
    student: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let format = Format::parse(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonlAttemptStore::new(&config.attempts_path);

    match student {
        Some(student_id) => {
            let records = store.attempts_for_student(&student_id).await?;
            let stats = quiz_stats_for_student(&records, &student_id);

            if format == Format::Json {
                let json = serde_json::to_string_pretty(&stats).context("failed to serialize stats")?;
                println!("{json}");
                return Ok(());
            }

            if stats.is_empty() {
                println!("No completed attempts for {student_id}.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec!["Quiz", "Attempts", "Best %", "Last completed"]);
            for (quiz_id, s) in &stats {
                table.add_row(vec![
                    Cell::new(quiz_id),
                    Cell::new(s.attempts),
                    Cell::new(format!("{:.1}", s.best_percentage)),
                    Cell::new(s.last_completed_at.format("%Y-%m-%d %H:%M UTC")),
                ]);
            }
            println!("Student: {student_id}");
            println!("{table}");
        }
        None => {
            let records = store.all_attempts().await?;
            let summary = analytics(&records);

            if format == Format::Json {
                let json =
                    serde_json::to_string_pretty(&summary).context("failed to serialize analytics")?;
                println!("{json}");
                return Ok(());
            }

            println!("Total attempts:  {}", summary.total_attempts);
            println!("Unique students: {}", summary.unique_students);
            println!("Average score:   {:.1}%", summary.average_percentage);
            println!("Pass rate:       {:.1}%", summary.pass_rate);

            if !summary.per_quiz.is_empty() {
                let mut table = Table::new();
                table.set_header(vec!["Quiz", "Attempts", "Average %", "Passed"]);
                for quiz in &summary.per_quiz {
                    table.add_row(vec![
                        Cell::new(&quiz.quiz_id),
                        Cell::new(quiz.attempts),
                        Cell::new(quiz.average_percentage),
                        Cell::new(quiz.passed),
                    ]);
                }
                println!("{table}");
            }
        }
    }

    Ok(())
}
