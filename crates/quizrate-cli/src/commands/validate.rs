//! The `quizrate validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let exams = if catalog_path.is_dir() {
        quizrate_core::parser::load_exam_directory(&catalog_path)?
    } else {
        vec![quizrate_core::parser::parse_exam(&catalog_path)?]
    };

    let mut total_warnings = 0;

    for exam in &exams {
        println!(
            "Exam: {} ({} questions, draws {})",
            exam.name,
            exam.questions.len(),
            exam.num_questions
        );

        let warnings = quizrate_core::parser::validate_exam(exam);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [Q{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
