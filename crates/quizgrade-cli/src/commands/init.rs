//! The `quizgrade init` command.

use anyhow::Result;

use quizgrade_store::load_config;

pub fn execute() -> Result<()> {
    let config = load_config()?;

    // Create quizgrade.toml
    if std::path::Path::new("quizgrade.toml").exists() {
        println!("quizgrade.toml already exists, skipping.");
    } else {
        std::fs::write("quizgrade.toml", SAMPLE_CONFIG)?;
        println!("Created quizgrade.toml");
    }

    // Create example quiz
    std::fs::create_dir_all(&config.quiz_dir)?;
    let example_path = config.quiz_dir.join("example.toml");
    if example_path.exists() {
        println!("{} already exists, skipping.", example_path.display());
    } else {
        let quiz = EXAMPLE_QUIZ.replace(
            "{passing_score}",
            &format!("{:.1}", config.default_passing_score),
        );
        std::fs::write(&example_path, quiz)?;
        println!("Created {}", example_path.display());
    }

    if std::path::Path::new("example-answers.json").exists() {
        println!("example-answers.json already exists, skipping.");
    } else {
        std::fs::write("example-answers.json", EXAMPLE_ANSWERS)?;
        println!("Created example-answers.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizgrade validate --quiz {}", example_path.display());
    println!(
        "  2. Run: quizgrade grade --quiz {} --answers example-answers.json",
        example_path.display()
    );
    println!(
        "  3. Run: quizgrade submit --quiz-id example --student you --answers example-answers.json"
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgrade configuration

quiz_dir = "./quizzes"
attempts_path = "./quizgrade-data/attempts.jsonl"
default_passing_score = 60.0
parallelism = 4
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "One question of each kind"
duration_minutes = 10
passing_score = {passing_score}
is_published = true

[[questions]]
id = "capital"
question_type = "multiple_choice"
question_text = "What is the capital of France?"
correct_answer = "Paris"
options = ["Paris", "London", "Berlin", "Madrid"]
points = 1

[[questions]]
id = "earth-round"
question_type = "true_false"
question_text = "The Earth is round."
correct_answer = "true"
points = 1

[[questions]]
id = "photosynthesis"
question_type = "fill_in_blank"
question_text = "Plants turn ___ and water into glucose and ___."
blanks = ["carbon dioxide", "oxygen"]
points = 2

[[questions]]
id = "rivers"
question_type = "match_following"
question_text = "Match each river to its country."
match_pairs = [
    { left = "Seine", right = "France" },
    { left = "Thames", right = "England" },
]
points = 2

[[questions]]
id = "define-gravity"
question_type = "short_answer"
question_text = "Define gravity in one sentence."
points = 2
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "capital": "Paris",
  "earth-round": "true",
  "photosynthesis": ["Carbon Dioxide", "oxygen"],
  "rivers": { "Seine": "France", "Thames": "France" },
  "define-gravity": "The force that pulls masses toward each other."
}
"#;
