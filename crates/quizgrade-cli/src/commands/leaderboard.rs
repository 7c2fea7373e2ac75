//! The `quizgrade leaderboard` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizgrade_core::statistics::leaderboard;
use quizgrade_core::traits::AttemptStore;
use quizgrade_store::{load_config_from, JsonlAttemptStore};

use super::Format;

pub async fn execute(
    quiz_id: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let format = Format::parse(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonlAttemptStore::new(&config.attempts_path);

    let records = match &quiz_id {
        Some(id) => store.attempts_for_quiz(id).await?,
        None => store.all_attempts().await?,
    };
    let board = leaderboard(&records);

    if format == Format::Json {
        let json = serde_json::to_string_pretty(&board).context("failed to serialize leaderboard")?;
        println!("{json}");
        return Ok(());
    }

    if board.is_empty() {
        println!("No completed attempts.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Rank", "Student", "Average %", "Best %", "Attempts"]);
    for (rank, entry) in board.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.student_id),
            Cell::new(entry.average_percentage),
            Cell::new(entry.best_percentage),
            Cell::new(entry.total_attempts),
        ]);
    }
    println!("{table}");

    Ok(())
}
