//! The `quizgrade grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizgrade_core::answer::load_answer_sheet;
use quizgrade_core::parser::parse_quiz;
use quizgrade_core::results::AttemptSummary;

use super::Format;

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    passing_score: Option<f64>,
    format: String,
    output: Option<PathBuf>,
    require_pass: bool,
) -> Result<()> {
    let format = Format::parse(&format)?;
    let quiz = parse_quiz(&quiz_path)?;
    let answers = load_answer_sheet(&answers_path)?;
    let passing_score = passing_score.unwrap_or(quiz.config.passing_score);

    let summary = quizgrade_core::grade(&quiz.questions, &answers, passing_score)
        .with_context(|| format!("failed to grade quiz '{}'", quiz.config.id))?;

    let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
    if let Some(path) = &output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        eprintln!("Summary saved to: {}", path.display());
    }

    match format {
        Format::Json => println!("{json}"),
        Format::Text => {
            println!("Quiz: {} ({} questions)", quiz.config.title, quiz.questions.len());
            print_summary(&summary, passing_score);
        }
    }

    if require_pass && !summary.passed {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(summary: &AttemptSummary, passing_score: f64) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Result", "Points"]);

    for result in &summary.results {
        let verdict = if result.needs_review {
            "review"
        } else if result.is_correct {
            "correct"
        } else if result.points_earned > 0.0 {
            "partial"
        } else {
            "incorrect"
        };
        table.add_row(vec![
            Cell::new(&result.question_id),
            Cell::new(result.question_type),
            Cell::new(verdict),
            Cell::new(format!("{}/{}", result.points_earned, result.points_possible)),
        ]);
    }

    println!("{table}");
    println!(
        "Score: {}/{} ({}%) {} (passing score {}%)",
        summary.score,
        summary.total_points,
        summary.percentage,
        if summary.passed { "PASSED" } else { "FAILED" },
        passing_score
    );

    println!(
        "Correct: {}/{}",
        summary.correct_count(),
        summary.results.len()
    );
    if summary.needs_review() {
        let review = summary.results.iter().filter(|r| r.needs_review).count();
        println!("{review} answer(s) need manual review.");
    }
}
