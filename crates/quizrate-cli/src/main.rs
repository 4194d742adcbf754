//! quizrate CLI: draw adaptive question sets and rate finished attempts.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizrate", version, about = "Adaptive exam engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a question set centered on a rating
    Draw {
        /// Path to the exam catalog .toml
        #[arg(long)]
        catalog: PathBuf,

        /// Rating the draw is centered on (usually the student's)
        #[arg(long, allow_negative_numbers = true)]
        peak: i32,

        /// Number of questions (default: the exam's num_questions)
        #[arg(long)]
        num: Option<usize>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a finished attempt and propose new ratings
    Finalize {
        /// Path to the exam catalog .toml
        #[arg(long)]
        catalog: PathBuf,

        /// JSON file with the submitted answers
        #[arg(long)]
        answers: PathBuf,

        /// The student's rating before the exam
        #[arg(long, allow_negative_numbers = true)]
        student_rating: i32,

        /// Student identifier stored in the attempt record
        #[arg(long, default_value = "anonymous")]
        student_id: String,

        /// Write the attempt record to this JSON file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate exam catalog files
    Validate {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Create starter config and example exam
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizrate=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Draw {
            catalog,
            peak,
            num,
            seed,
            format,
            config,
        } => commands::draw::execute(catalog, peak, num, seed, format, config),
        Commands::Finalize {
            catalog,
            answers,
            student_rating,
            student_id,
            record,
            format,
            config,
        } => commands::finalize::execute(
            catalog,
            answers,
            student_rating,
            student_id,
            record,
            format,
            config,
        ),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
