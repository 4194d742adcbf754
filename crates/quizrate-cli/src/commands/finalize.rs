//! The `quizrate finalize` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;

use quizrate_core::attempt::Attempt;
use quizrate_core::config::load_config_from;
use quizrate_core::model::{QuestionId, SubmittedAnswer};
use quizrate_core::{parser, ExamEngine};

fn load_answers(path: &Path) -> Result<Vec<SubmittedAnswer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers JSON: {}", path.display()))
}

pub fn execute(
    catalog: PathBuf,
    answers_path: PathBuf,
    student_rating: i32,
    student_id: String,
    record_path: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = ExamEngine::new(config)?;
    let exam = parser::parse_exam(&catalog)?;
    let answers = load_answers(&answers_path)?;
    anyhow::ensure!(!answers.is_empty(), "answers file contains no answers");

    // The answered questions are the drawn set, in the order they were answered.
    // A repeated id is rejected by the attempt below.
    let mut drawn: Vec<QuestionId> = Vec::with_capacity(answers.len());
    for answer in &answers {
        if !drawn.contains(&answer.question_id) {
            drawn.push(answer.question_id);
        }
    }

    let mut attempt = Attempt::new(
        exam.id.clone(),
        student_id,
        student_rating,
        exam.questions_for(&drawn)?,
    )?;
    for answer in answers {
        attempt.submit(answer)?;
    }
    let record = attempt.finalize(engine.rating_engine())?;

    if let Some(path) = &record_path {
        record.save_json(path)?;
        tracing::info!("attempt record written to {}", path.display());
    }

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        _ => {
            let outcome = &record.outcome;
            let new_ratings = outcome.new_question_ratings();
            let mut table = Table::new();
            table.set_header(vec![
                "Question", "Score", "Expected", "Change", "Rating", "New rating",
            ]);
            for s in &outcome.scores {
                table.add_row(vec![
                    s.question_id.to_string(),
                    format!("{:.2}", s.score),
                    format!("{:.3}", s.expected),
                    format!("{:+}", s.question_delta),
                    s.question_rating_before.to_string(),
                    new_ratings[&s.question_id].to_string(),
                ]);
            }
            println!("{table}");
            println!(
                "Score: {:.2} / {}",
                outcome.total_score(),
                outcome.scores.len()
            );
            println!(
                "Student rating: {} -> {} ({:+})",
                record.student_rating_before,
                record.student_rating_after(),
                outcome.student_delta
            );
        }
    }

    Ok(())
}
