//! The `quizrate init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizrate.toml").exists() {
        println!("quizrate.toml already exists, skipping.");
    } else {
        std::fs::write("quizrate.toml", SAMPLE_CONFIG)?;
        println!("Created quizrate.toml");
    }

    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizrate validate --catalog exams/example.toml");
    println!("  2. Run: quizrate draw --catalog exams/example.toml --peak 1500");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizrate configuration

[sampler]
# rating gap at which a question's draw weight halves
tolerance = 300.0

[rating]
# score expected when student and question ratings are equal
zero_score = 0.7
span = 200.0
# maximum rating change on a single question
multiplier = 50.0
precision = 6
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
id = "example"
name = "Example Exam"
description = "A small exam to get started"
num_questions = 2

[[questions]]
id = 1
type = "single_choice"
text = "What is 3 * 4?"
rating = 1400

[[questions.options]]
id = 101
text = "12"
correct = true

[[questions.options]]
id = 102
text = "7"

[[questions]]
id = 2
type = "multiple_choice"
text = "Which numbers are prime?"
rating = 1550

[[questions.options]]
id = 201
text = "2"
correct = true

[[questions.options]]
id = 202
text = "9"

[[questions.options]]
id = 203
text = "13"
correct = true

[[questions]]
id = 3
type = "open_ended"
text = "Explain why division by zero is undefined."
rating = 1700
"#;
