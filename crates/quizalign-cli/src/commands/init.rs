//! The `quizalign init` command.

use anyhow::Result;

use quizalign_core::ontology::BUILTIN_BANK;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizalign.toml").exists() {
        println!("quizalign.toml already exists, skipping.");
    } else {
        std::fs::write("quizalign.toml", SAMPLE_CONFIG)?;
        println!("Created quizalign.toml");
    }

    let bank_path = std::path::Path::new("keywords.toml");
    if bank_path.exists() {
        println!("keywords.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, BUILTIN_BANK)?;
        println!("Created keywords.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set QUIZALIGN_OPENAI_KEY to use the openai provider");
    println!("  2. Run: quizalign keywords --subject Matematica --topic \"Equazioni\" --class \"2ª media\"");
    println!("  3. Run: quizalign generate --subject Matematica --topic \"Equazioni\" --class \"2ª media\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizalign configuration

default_provider = "template"
attempt_timeout_secs = 60
max_attempts = 3
keyword_bank = "keywords.toml"
output_dir = "./quizalign-reports"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
model = "gpt-4.1-mini"

[providers.template]
type = "template"

[alignment]
min_item_coverage = 0.65
min_avg_coverage = 0.65
min_accept_ratio = 0.7
# or token_filter = "stopwords" to filter topic words by the bank's stopword list
token_filter = { min_length = 3 }
"#;
