//! The `quizrate draw` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use quizrate_core::config::load_config_from;
use quizrate_core::model::QuestionId;
use quizrate_core::{parser, ExamEngine};

#[derive(Serialize)]
struct DrawOutput<'a> {
    exam_id: &'a str,
    peak: i32,
    question_ids: &'a [QuestionId],
}

pub fn execute(
    catalog: PathBuf,
    peak: i32,
    num: Option<usize>,
    seed: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = ExamEngine::new(config)?;
    let exam = parser::parse_exam(&catalog)?;
    let num_questions = num.unwrap_or(exam.num_questions);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ids = engine.draw_questions(&exam.pool(), Some(peak), num_questions, &mut rng)?;
    tracing::debug!(exam = %exam.id, "drew {} of {} questions", ids.len(), exam.questions.len());

    match format.as_str() {
        "json" => {
            let output = DrawOutput {
                exam_id: &exam.id,
                peak,
                question_ids: &ids,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!(
                "Exam: {} ({} of {} questions, peak {peak})",
                exam.name,
                ids.len(),
                exam.questions.len()
            );
            let mut table = Table::new();
            table.set_header(vec!["#", "Question", "Type", "Rating", "Text"]);
            for (position, question) in exam.questions_for(&ids)?.iter().enumerate() {
                table.add_row(vec![
                    (position + 1).to_string(),
                    question.id.to_string(),
                    question.question_type.to_string(),
                    question.rating.to_string(),
                    question.text.clone(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
