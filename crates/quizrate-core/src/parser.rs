//! TOML exam catalog parser.
//!
//! Loads exams from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerOption, Exam, Question, QuestionType, Rating, DEFAULT_RATING};

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    num_questions: usize,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u64,
    #[serde(rename = "type")]
    question_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    rating: Option<Rating>,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: u64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    correct: bool,
}

/// Parse a single TOML file into an `Exam`.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `Exam` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let question_type: QuestionType = q
                .question_type
                .parse()
                .with_context(|| format!("question {} in {}", q.id, source_path.display()))?;

            Ok(Question {
                id: q.id,
                question_type,
                text: q.text,
                rating: q.rating.unwrap_or(DEFAULT_RATING),
                options: q
                    .options
                    .into_iter()
                    .map(|o| AnswerOption {
                        id: o.id,
                        text: o.text,
                        correct: o.correct,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Exam {
        id: parsed.exam.id,
        name: parsed.exam.name,
        description: parsed.exam.description,
        num_questions: parsed.exam.num_questions,
        questions,
    })
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u64>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam for common issues.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.num_questions == 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "num_questions is zero".into(),
        });
    }
    if exam.num_questions > exam.questions.len() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "not enough questions: num_questions is {} but the exam has {}",
                exam.num_questions,
                exam.questions.len()
            ),
        });
    }

    let mut seen_ids = HashSet::new();
    let mut seen_options = HashSet::new();
    for question in &exam.questions {
        let warn = |message: String| ValidationWarning {
            question_id: Some(question.id),
            message,
        };

        if !seen_ids.insert(question.id) {
            warnings.push(warn(format!("duplicate question ID: {}", question.id)));
        }
        for option in &question.options {
            if !seen_options.insert(option.id) {
                warnings.push(warn(format!("duplicate option ID: {}", option.id)));
            }
        }

        let correct = question.options.iter().filter(|o| o.correct).count();
        match question.question_type {
            QuestionType::SingleChoice | QuestionType::MultipleChoice if correct == 0 => {
                warnings.push(warn("no option is marked correct".into()));
            }
            QuestionType::SingleChoice if correct > 1 => {
                warnings.push(warn(format!(
                    "single-choice question has {correct} correct options"
                )));
            }
            QuestionType::OpenEnded if !question.options.is_empty() => {
                warnings.push(warn(
                    "open-ended question has options that will be ignored".into(),
                ));
            }
            _ => {}
        }
    }

    warnings
}
