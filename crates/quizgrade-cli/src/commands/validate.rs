//! The `quizgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgrade_core::parser::{load_quiz_directory, parse_quiz, validate_quiz};

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = if quiz_path.is_dir() {
        load_quiz_directory(&quiz_path)?
    } else {
        vec![parse_quiz(&quiz_path)?]
    };

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} [{}] ({} questions, passing score {}%)",
            quiz.config.title,
            quiz.config.id,
            quiz.questions.len(),
            quiz.config.passing_score
        );

        let warnings = validate_quiz(quiz);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if quizzes.is_empty() {
        println!("No quizzes found.");
    } else if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
