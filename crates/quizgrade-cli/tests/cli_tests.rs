//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FULL_MARKS: &str = r#"{
  "capital-fr": "Paris",
  "equator": "true",
  "nile": ["Nile", "Mediterranean"],
  "rivers": { "Seine": "France", "Ganges": "India", "Volga": "Russia" },
  "landlocked": "Mongolia",
  "plates": "Colliding plates fold and lift the crust."
}"#;

// 2 + 0 + 2 + 2 + 1 + 0 = 7 of 11 points -> 64%.
const PARTIAL_MARKS: &str = r#"{
  "capital-fr": "Paris",
  "equator": "false",
  "nile": [" nile", "MEDITERRANEAN"],
  "rivers": { "Seine": "France", "Ganges": "India", "Volga": "Ukraine" },
  "landlocked": "Mongolia"
}"#;

fn quizgrade() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizgrade").unwrap();
    cmd.env_remove("QUIZGRADE_QUIZ_DIR")
        .env_remove("QUIZGRADE_ATTEMPTS_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn quiz_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../quizzes")
}

fn write_answers(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a config pointing at the sample quizzes and a temp attempt log.
fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("quizgrade.toml");
    let config = format!(
        "quiz_dir = '{}'\nattempts_path = '{}'\nparallelism = 2\n",
        quiz_dir().display(),
        dir.path().join("data").join("attempts.jsonl").display()
    );
    std::fs::write(&path, config).unwrap();
    path
}

fn submit(config: &Path, student: &str, answers: &Path) {
    quizgrade()
        .arg("submit")
        .arg("--quiz-id")
        .arg("geography-101")
        .arg("--student")
        .arg(student)
        .arg("--answers")
        .arg(answers)
        .arg("--config")
        .arg(config)
        .assert()
        .success();
}

#[test]
fn validate_geography_quiz() {
    quizgrade()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("World Geography"))
        .stdout(predicate::str::contains("6 questions"))
        .stdout(predicate::str::contains("[plates] WARNING"))
        .stdout(predicate::str::contains("needs manual review"));
}

#[test]
fn validate_clean_quiz() {
    quizgrade()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes/arithmetic.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arithmetic Basics"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    quizgrade()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("World Geography"))
        .stdout(predicate::str::contains("Arithmetic Basics"));
}

#[test]
fn validate_nonexistent_file() {
    quizgrade()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_full_marks() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", FULL_MARKS);

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 11/11 (100%) PASSED"))
        .stdout(predicate::str::contains("2 answer(s) need manual review"));
}

#[test]
fn grade_partial_json() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", PARTIAL_MARKS);

    let output = quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["score"], 7.0);
    assert_eq!(summary["total_points"], 11.0);
    assert_eq!(summary["percentage"], 64);
    assert_eq!(summary["passed"], false);

    let results = summary["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);
    let rivers = results
        .iter()
        .find(|r| r["question_id"] == "rivers")
        .unwrap();
    assert_eq!(rivers["is_correct"], false);
    assert_eq!(rivers["points_earned"], 2.0);
}

#[test]
fn grade_null_answers_count_as_missing() {
    let dir = TempDir::new().unwrap();
    // 2 + 0 + 0 + 2 + 1 + 0 = 5 of 11 points -> 45%.
    let answers = write_answers(
        &dir,
        "answers.json",
        r#"{
  "capital-fr": "Paris",
  "equator": null,
  "nile": [null, "Mediterranean"],
  "rivers": { "Seine": "France", "Ganges": null, "Volga": "Russia" },
  "landlocked": "Mongolia",
  "plates": null
}"#,
    );

    let output = quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["score"], 5.0);
    assert_eq!(summary["percentage"], 45);

    let results = summary["results"].as_array().unwrap();
    let equator = results
        .iter()
        .find(|r| r["question_id"] == "equator")
        .unwrap();
    assert!(equator["student_answer"].is_null());
    let nile = results.iter().find(|r| r["question_id"] == "nile").unwrap();
    assert_eq!(nile["points_earned"], 0.0);
}

#[test]
fn grade_require_pass_fails_below_threshold() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", PARTIAL_MARKS);

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--require-pass")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"));
}

#[test]
fn grade_passing_score_override() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", PARTIAL_MARKS);

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--passing-score")
        .arg("60")
        .arg("--require-pass")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED (passing score 60%)"));
}

#[test]
fn grade_rejects_invalid_passing_score() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", FULL_MARKS);

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--passing-score")
        .arg("150")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside 0..=100"));
}

#[test]
fn grade_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", FULL_MARKS);
    let output = dir.path().join("out").join("summary.json");

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/arithmetic.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0/6 (0%) FAILED"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["percentage"], 0);
}

#[test]
fn grade_unknown_format() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", FULL_MARKS);

    quizgrade()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/geography.toml")
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn submit_then_report() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let full = write_answers(&dir, "full.json", FULL_MARKS);
    let partial = write_answers(&dir, "partial.json", PARTIAL_MARKS);

    submit(&config, "ana", &full);
    submit(&config, "ben", &partial);

    let log = std::fs::read_to_string(dir.path().join("data").join("attempts.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 2);

    let output = quizgrade()
        .arg("leaderboard")
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let board: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(board[0]["student_id"], "ana");
    assert_eq!(board[0]["average_percentage"], 100);
    assert_eq!(board[1]["student_id"], "ben");
    assert_eq!(board[1]["average_percentage"], 64);

    quizgrade()
        .arg("leaderboard")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("ana"))
        .stdout(predicate::str::contains("Rank"));

    quizgrade()
        .arg("stats")
        .arg("--student")
        .arg("ben")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("geography-101"))
        .stdout(predicate::str::contains("63.6"));

    quizgrade()
        .arg("stats")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total attempts:  2"))
        .stdout(predicate::str::contains("Pass rate:       50.0%"));
}

#[test]
fn submit_unknown_quiz() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let answers = write_answers(&dir, "answers.json", FULL_MARKS);

    quizgrade()
        .arg("submit")
        .arg("--quiz-id")
        .arg("no-such-quiz")
        .arg("--student")
        .arg("ana")
        .arg("--answers")
        .arg(&answers)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("quiz not found: no-such-quiz"));

    assert!(!dir.path().join("data").join("attempts.jsonl").exists());
}

#[test]
fn submit_batch() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let batch = format!(
        r#"[
  {{ "quiz_id": "geography-101", "student_id": "ana", "answers": {FULL_MARKS} }},
  {{ "quiz_id": "geography-101", "student_id": "ben", "answers": {PARTIAL_MARKS},
     "started_at": "2026-10-01T09:00:00Z" }},
  {{ "quiz_id": "arithmetic", "student_id": "cid", "answers": {{ "sum": "12" }} }}
]"#
    );
    let batch_path = write_answers(&dir, "batch.json", &batch);

    quizgrade()
        .arg("submit")
        .arg("--batch")
        .arg(&batch_path)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 3 submission(s) recorded"))
        .stdout(predicate::str::contains("cid on arithmetic"));

    let log = std::fs::read_to_string(dir.path().join("data").join("attempts.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 3);
}

#[test]
fn submit_requires_answers_without_batch() {
    quizgrade()
        .arg("submit")
        .arg("--quiz-id")
        .arg("geography-101")
        .assert()
        .failure();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizgrade()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizgrade.toml"))
        .stdout(predicate::str::contains("example.toml"));

    assert!(dir.path().join("quizgrade.toml").exists());
    assert!(dir.path().join("quizzes").join("example.toml").exists());

    quizgrade()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg("quizzes/example.toml")
        .arg("--answers")
        .arg("example-answers.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 7/8 (88%) PASSED"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizgrade()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("init")
        .assert()
        .success();

    quizgrade()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    quizgrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deterministic quiz grading engine"));
}

#[test]
fn version_output() {
    quizgrade()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizgrade"));
}
