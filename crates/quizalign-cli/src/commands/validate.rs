//! The `quizalign validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizalign_core::align::AlignmentContext;
use quizalign_core::batch::{parse_batch, Candidate};
use quizalign_core::model::GenerationRequest;
use quizalign_core::normalize::post_process;
use quizalign_core::scorer::score_item;
use quizalign_core::traits::extract_json_object;
use quizalign_core::validator::{coverage_score, validate_item};
use quizalign_providers::config::load_config_from;

pub fn execute(
    items_path: PathBuf,
    subject: String,
    topic: String,
    class_label: String,
    description: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = config.load_keyword_bank()?;

    let content = std::fs::read_to_string(&items_path)
        .with_context(|| format!("failed to read items: {}", items_path.display()))?;
    let candidates = parse_batch(&extract_json_object(&content))
        .with_context(|| format!("failed to parse items: {}", items_path.display()))?;

    let request = GenerationRequest {
        description,
        ..GenerationRequest::new(&subject, &topic, &class_label)
    };
    let ctx = AlignmentContext::build(&bank, &request, &config.alignment);

    println!(
        "Batch: {} item(s), {} keyword(s), band {}",
        candidates.len(),
        ctx.keywords.len(),
        ctx.class_band.band
    );

    let mut valid = 0;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let n = i + 1;
        match candidate {
            Candidate::Item(item) => {
                let item = post_process(item);
                let verdict = validate_item(&item, &ctx);
                let coverage = coverage_score(&item.prompt, &ctx.keywords);
                if verdict.ok {
                    valid += 1;
                    println!(
                        "  [{n}] OK   {} coverage {:.2} score {:.2}",
                        item.kind,
                        coverage,
                        score_item(&item, &ctx)
                    );
                } else {
                    let reasons: Vec<String> =
                        verdict.reasons.iter().map(ToString::to_string).collect();
                    println!(
                        "  [{n}] FAIL {} coverage {:.2}: {}",
                        item.kind,
                        coverage,
                        reasons.join(", ")
                    );
                }
            }
            Candidate::Undecodable(error) => {
                println!("  [{n}] FAIL schema: {error}");
            }
        }
    }

    println!("\n{valid} valid item(s).");

    Ok(())
}
