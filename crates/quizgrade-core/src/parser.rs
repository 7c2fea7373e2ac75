//! Quiz loading.
//!
//! Loads quizzes from TOML files and directories, validates them, and turns
//! the JSON payload of an LLM quiz generator into checked [`Question`]s.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{MatchPair, Question, QuestionKind, QuestionRecord, QuestionType, Quiz, QuizConfig};
use crate::traits::sort_by_order_index;

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: QuizConfig,
    #[serde(default)]
    questions: Vec<QuestionRecord>,
}

/// Parse a single TOML file into a [`Quiz`].
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a [`Quiz`] (useful for testing).
///
/// Questions without an explicit `quiz_id` inherit the quiz's id, and those
/// without an `order_index` take their position in the file.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let config = parsed.quiz;
    anyhow::ensure!(
        (0.0..=100.0).contains(&config.passing_score),
        "passing_score must be between 0 and 100 in {}, got {}",
        source_path.display(),
        config.passing_score
    );

    let mut questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(position, mut record)| {
            if record.quiz_id.is_empty() {
                record.quiz_id = config.id.clone();
            }
            if record.order_index.is_none() {
                record.order_index = Some(position as u32);
            }
            let id = record.id.clone();
            Question::try_from(record)
                .with_context(|| format!("invalid question '{id}' in {}", source_path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    sort_by_order_index(&mut questions);

    Ok(Quiz { config, questions })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn quiz(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }

    fn question(question: &Question, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a quiz for issues that parse cleanly but grade badly.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning::quiz("quiz has no questions and cannot be graded"));
    }
    if quiz.config.passing_score == 0.0 {
        warnings.push(ValidationWarning::quiz("passing_score is 0, every attempt passes"));
    }

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                question,
                format!("duplicate question ID: {}", question.id),
            ));
        }

        if question.question_text.trim().is_empty() {
            warnings.push(ValidationWarning::question(question, "question text is empty"));
        }

        match &question.kind {
            QuestionKind::MultipleChoice { options } => {
                if options.len() != 4 {
                    warnings.push(ValidationWarning::question(
                        question,
                        format!("multiple_choice has {} options, expected 4", options.len()),
                    ));
                }
                let unique: HashSet<_> = options.iter().collect();
                if unique.len() != options.len() {
                    warnings.push(ValidationWarning::question(question, "duplicate options"));
                }
            }
            QuestionKind::MatchFollowing { pairs } => {
                if pairs.is_empty() {
                    warnings.push(ValidationWarning::question(
                        question,
                        "match_following has no pairs and can never earn points",
                    ));
                }
                let lefts: HashSet<_> = pairs.iter().map(|p| &p.left).collect();
                if lefts.len() != pairs.len() {
                    warnings.push(ValidationWarning::question(
                        question,
                        "duplicate left items in match_pairs",
                    ));
                }
            }
            QuestionKind::ShortAnswer | QuestionKind::LongAnswer => {
                warnings.push(ValidationWarning::question(
                    question,
                    format!(
                        "{} is only checked for a non-empty answer and needs manual review",
                        question.question_type()
                    ),
                ));
            }
            QuestionKind::TrueFalse | QuestionKind::FillInBlank { .. } => {}
        }
    }

    warnings
}

// ---------------------------------------------------------------------------
// Generated quiz payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    #[serde(default)]
    question_text: String,
    question_type: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    correct_answer: Option<serde_json::Value>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    blanks: Option<Vec<String>>,
    #[serde(default)]
    match_pairs: Option<Vec<MatchPair>>,
    #[serde(default)]
    points: Option<f64>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Extract a JSON document from an LLM response.
///
/// Handles:
/// - ```json fenced blocks (preferred)
/// - generic ``` blocks
/// - truncated, unclosed fences
/// - raw JSON with no fences (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else {
            generic_blocks.push(current_block);
        }
    }

    json_blocks
        .into_iter()
        .next()
        .or_else(|| generic_blocks.into_iter().next())
        .unwrap_or_else(|| response.trim().to_string())
}

/// Turn an LLM quiz-generation response into validated questions.
///
/// Normalization applied before validation:
/// - missing or zero `points` become 1;
/// - ids are `{quiz_id}-q{n}` and `order_index` is the position;
/// - fields that do not belong to the question type are dropped;
/// - `true_false` answers are trimmed and lower-cased (JSON booleans accepted);
/// - a `fill_in_blank` without `blanks` falls back to a JSON array in
///   `correct_answer`.
pub fn parse_generated_questions(response: &str, quiz_id: &str) -> Result<Vec<Question>> {
    let json = extract_json_from_markdown(response);
    let payload: GeneratedPayload =
        serde_json::from_str(&json).context("generated quiz is not a valid questions payload")?;

    payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(position, generated)| {
            let id = format!("{quiz_id}-q{}", position + 1);
            let record = normalize_generated(generated, &id, quiz_id, position as u32);
            Question::try_from(record)
                .with_context(|| format!("generated question {} is invalid", position + 1))
        })
        .collect()
}

fn normalize_generated(
    generated: GeneratedQuestion,
    id: &str,
    quiz_id: &str,
    order_index: u32,
) -> QuestionRecord {
    let question_type = generated.question_type.trim().to_lowercase();
    let parsed_type = question_type.parse::<QuestionType>().ok();

    let mut correct_answer = generated.correct_answer.and_then(|value| match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    });

    let non_empty = |items: Option<Vec<String>>| items.filter(|v| !v.is_empty());
    let mut options = non_empty(generated.options);
    let mut blanks = non_empty(generated.blanks);
    let mut match_pairs = generated.match_pairs;

    match parsed_type {
        Some(QuestionType::MultipleChoice) => {
            blanks = None;
            match_pairs = None;
        }
        Some(QuestionType::FillInBlank) => {
            options = None;
            match_pairs = None;
            if blanks.is_none() {
                blanks = correct_answer
                    .as_deref()
                    .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
                    .filter(|v| !v.is_empty());
            }
        }
        Some(QuestionType::MatchFollowing) => {
            options = None;
            blanks = None;
        }
        Some(QuestionType::TrueFalse) => {
            options = None;
            blanks = None;
            match_pairs = None;
            correct_answer = correct_answer.map(|s| s.trim().to_lowercase());
        }
        Some(QuestionType::ShortAnswer | QuestionType::LongAnswer) => {
            options = None;
            blanks = None;
            match_pairs = None;
        }
        // Left untouched so conversion reports the unknown type.
        None => {}
    }

    QuestionRecord {
        id: id.to_string(),
        quiz_id: quiz_id.to_string(),
        question_text: generated.question_text,
        question_type,
        difficulty: generated.difficulty,
        correct_answer,
        options,
        blanks,
        match_pairs,
        points: generated.points.filter(|p| *p != 0.0).unwrap_or(1.0),
        explanation: generated.explanation.filter(|e| !e.trim().is_empty()),
        order_index: Some(order_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "geo-101"
title = "World Capitals"
description = "Capitals and borders"
passing_score = 70
duration_minutes = 15

[[questions]]
id = "capital-fr"
question_type = "multiple_choice"
question_text = "What is the capital of France?"
correct_answer = "Paris"
options = ["Paris", "London", "Berlin", "Madrid"]
points = 2
explanation = "Paris has been the capital since 987."

[[questions]]
id = "blanks"
question_type = "fill_in_blank"
question_text = "The ___ chases the ___."
blanks = ["cat", "mouse"]
points = 3

[[questions]]
id = "rivers"
question_type = "match_following"
question_text = "Match rivers to countries"
match_pairs = [
    { left = "Seine", right = "France" },
    { left = "Danube", right = "Austria" },
]
points = 4
"#;

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("geo.toml")).unwrap();
        assert_eq!(quiz.config.id, "geo-101");
        assert_eq!(quiz.config.passing_score, 70.0);
        assert_eq!(quiz.config.duration_minutes, 15);
        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.questions[0].quiz_id, "geo-101");
        assert_eq!(quiz.questions[2].order_index, 2);
        assert_eq!(quiz.questions[1].question_type(), QuestionType::FillInBlank);
    }

    #[test]
    fn parse_orders_by_order_index() {
        let toml = r#"
[quiz]
id = "ordered"
title = "Ordered"

[[questions]]
id = "second"
question_type = "true_false"
correct_answer = "true"
points = 1
order_index = 5

[[questions]]
id = "first"
question_type = "short_answer"
points = 1
order_index = 1
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("ordered.toml")).unwrap();
        let ids: Vec<&str> = quiz.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(quiz.config.passing_score, 60.0);
    }

    #[test]
    fn parse_rejects_malformed_question() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "mc"
question_type = "multiple_choice"
correct_answer = "A"
points = 1
"#;
        let err = parse_quiz_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid question 'mc'"), "{message}");
        assert!(message.contains("requires options"), "{message}");
    }

    #[test]
    fn parse_rejects_out_of_range_passing_score() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"
passing_score = 150
"#;
        assert!(parse_quiz_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_flags_grading_hazards() {
        let toml = r#"
[quiz]
id = "hazards"
title = "Hazards"
passing_score = 0

[[questions]]
id = "dup"
question_type = "multiple_choice"
question_text = "Pick"
correct_answer = "A"
options = ["A", "B", "A"]
points = 1

[[questions]]
id = "dup"
question_type = "match_following"
question_text = "Match"
match_pairs = []
points = 1

[[questions]]
id = "essay"
question_type = "long_answer"
question_text = "Discuss"
points = 5
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("hazards.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));

        assert!(has("every attempt passes"));
        assert!(has("duplicate question ID"));
        assert!(has("3 options, expected 4"));
        assert!(has("duplicate options"));
        assert!(has("can never earn points"));
        assert!(has("needs manual review"));
    }

    #[test]
    fn validate_clean_quiz_has_no_warnings() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("geo.toml")).unwrap();
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("geo.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "[quiz]\nid = 1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested").join("tf.toml"),
            "[quiz]\nid = \"tf\"\ntitle = \"TF\"\n",
        )
        .unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        let ids: Vec<&str> = quizzes.iter().map(|q| q.config.id.as_str()).collect();
        assert_eq!(ids, vec!["geo-101", "tf"]);
    }

    #[test]
    fn extract_json_block() {
        let input = "Here you go:\n```json\n{\"questions\": []}\n```\nEnjoy!";
        assert_eq!(extract_json_from_markdown(input), "{\"questions\": []}");
    }

    #[test]
    fn extract_generic_block_and_raw() {
        assert_eq!(extract_json_from_markdown("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json_from_markdown("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn extract_truncated_block() {
        let input = "```json\n{\"questions\": [";
        assert_eq!(extract_json_from_markdown(input), "{\"questions\": [");
    }

    #[test]
    fn generated_questions_are_normalized() {
        let response = r#"```json
{
  "questions": [
    {
      "question_text": "Is water wet?",
      "question_type": "true_false",
      "correct_answer": true,
      "options": [],
      "blanks": [],
      "explanation": ""
    },
    {
      "question_text": "The ___ is blue",
      "question_type": "fill_in_blank",
      "correct_answer": ["sky"],
      "points": 2
    },
    {
      "question_text": "Capital of Italy?",
      "question_type": "multiple_choice",
      "correct_answer": "Rome",
      "options": ["Rome", "Milan", "Turin", "Naples"],
      "match_pairs": [],
      "points": 0
    }
  ]
}
```"#;
        let questions = parse_generated_questions(response, "gen").unwrap();
        assert_eq!(questions.len(), 3);

        assert_eq!(questions[0].id, "gen-q1");
        assert_eq!(questions[0].correct_answer, "true");
        assert_eq!(questions[0].points, 1.0);
        assert!(questions[0].explanation.is_none());

        assert_eq!(
            questions[1].kind,
            QuestionKind::FillInBlank {
                blanks: vec!["sky".into()]
            }
        );
        assert_eq!(questions[1].order_index, 1);

        assert_eq!(questions[2].points, 1.0);
        assert_eq!(questions[2].question_type(), QuestionType::MultipleChoice);
    }

    #[test]
    fn generated_unknown_type_is_an_error() {
        let response = r#"{"questions": [{"question_type": "essay", "correct_answer": "x"}]}"#;
        let err = parse_generated_questions(response, "gen").unwrap_err();
        assert!(format!("{err:#}").contains("unknown question type 'essay'"));
    }

    #[test]
    fn generated_garbage_is_an_error() {
        assert!(parse_generated_questions("I could not generate a quiz.", "gen").is_err());
    }
}
