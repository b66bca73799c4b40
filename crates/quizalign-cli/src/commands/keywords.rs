//! The `quizalign keywords` command.

use std::path::PathBuf;

use anyhow::Result;

use quizalign_core::band::classify;
use quizalign_core::keywords::extract_keywords_with;
use quizalign_core::validator::COVERAGE_WINDOW;
use quizalign_providers::config::load_config_from;

pub fn execute(
    subject: String,
    topic: String,
    class_label: String,
    description: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = config.load_keyword_bank()?;

    let class_band = classify(&class_label);
    println!(
        "Band: {} (scuola {}, {}-{} anni), max {} words, lexicon {}",
        class_band.band,
        class_band.band.label(),
        class_band.min_age,
        class_band.max_age,
        class_band.max_prompt_words,
        class_band.lexicon
    );

    if bank.subject(&subject).is_none() {
        println!(
            "Subject '{}' is not in the keyword bank (known: {})",
            subject.trim(),
            bank.subjects().join(", ")
        );
    }

    let keywords = extract_keywords_with(
        &bank,
        &subject,
        &topic,
        description.as_deref(),
        config.alignment.token_filter,
    );
    println!("Keywords ({}):", keywords.len());
    for (i, keyword) in keywords.iter().enumerate() {
        let marker = if i < COVERAGE_WINDOW { "*" } else { " " };
        println!("  {marker} {:>2}. {keyword}", i + 1);
    }
    println!("\n* counted towards coverage");

    Ok(())
}
