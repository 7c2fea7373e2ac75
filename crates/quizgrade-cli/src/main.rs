//! quizgrade CLI — grade quizzes and report on recorded attempts.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizgrade", version, about = "Deterministic quiz grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade an answer sheet against a quiz file without recording it
    Grade {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to the answer sheet JSON (question id -> answer)
        #[arg(long)]
        answers: PathBuf,

        /// Override the quiz's passing score (0-100)
        #[arg(long)]
        passing_score: Option<f64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also write the JSON summary to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit code 1 if the attempt does not pass
        #[arg(long)]
        require_pass: bool,
    },

    /// Grade a submission and append it to the attempt log
    Submit {
        /// Quiz id to submit against
        #[arg(long, required_unless_present = "batch")]
        quiz_id: Option<String>,

        /// Student id
        #[arg(long, required_unless_present = "batch")]
        student: Option<String>,

        /// Path to the answer sheet JSON
        #[arg(long, required_unless_present = "batch")]
        answers: Option<PathBuf>,

        /// When the student started (RFC 3339)
        #[arg(long)]
        started_at: Option<String>,

        /// JSON array of submissions to grade concurrently
        #[arg(long, conflicts_with_all = ["quiz_id", "student", "answers", "started_at"])]
        batch: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Rank students by average percentage
    Leaderboard {
        /// Only count attempts on this quiz
        #[arg(long)]
        quiz_id: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a student's per-quiz history, or analytics over all attempts
    Stats {
        /// Student id (omit for analytics across all students)
        #[arg(long)]
        student: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quizgrade=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            answers,
            passing_score,
            format,
            output,
            require_pass,
        } => commands::grade::execute(quiz, answers, passing_score, format, output, require_pass),
        Commands::Submit {
            quiz_id,
            student,
            answers,
            started_at,
            batch,
            config,
        } => {
            commands::submit::execute(quiz_id, student, answers, started_at, batch, config).await
        }
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Leaderboard {
            quiz_id,
            format,
            config,
        } => commands::leaderboard::execute(quiz_id, format, config).await,
        Commands::Stats {
            student,
            format,
            config,
        } => commands::stats::execute(student, format, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
