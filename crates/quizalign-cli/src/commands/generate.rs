//! The `quizalign generate` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizalign_core::diagnostics::Diagnostics;
use quizalign_core::engine::{GenerationEngine, GenerationOutcome, ProgressReporter};
use quizalign_core::model::{Difficulty, GenerationRequest};
use quizalign_core::report::GenerationReport;
use quizalign_core::scorer::score_item;
use quizalign_core::validator::coverage_score;
use quizalign_providers::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, attempt: u32, remaining: usize) {
        eprintln!("  Attempt {attempt}: requesting {remaining} item(s)");
    }

    fn on_attempt_complete(&self, attempt: u32, accepted: usize, rejected: usize) {
        eprintln!("  Attempt {attempt}: {accepted} accepted, {rejected} rejected");
    }

    fn on_attempt_error(&self, attempt: u32, error: &str) {
        eprintln!("  Attempt {attempt} ERROR: {error}");
    }

    fn on_generation_complete(&self, diagnostics: &Diagnostics, elapsed: Duration) {
        eprintln!(
            "\nComplete: {}/{} items after {} attempt(s), avg coverage {:.2} ({:.1}s)",
            diagnostics.accepted_count,
            diagnostics.requested_count,
            diagnostics.attempts,
            diagnostics.avg_coverage,
            elapsed.as_secs_f64()
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    subject: String,
    topic: String,
    class_label: String,
    description: Option<String>,
    difficulty: String,
    count: usize,
    mix: bool,
    strict: bool,
    provider: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse().map_err(anyhow::Error::msg)?;

    let config = load_config_from(config_path.as_deref())?;
    let bank = Arc::new(config.load_keyword_bank()?);
    let generator = config.generator(provider.as_deref(), Arc::clone(&bank))?;
    tracing::debug!(generator = generator.name(), "generator selected");

    let request = GenerationRequest {
        description,
        difficulty,
        count,
        mix,
        strict,
        ..GenerationRequest::new(&subject, &topic, &class_label)
    };

    let engine = GenerationEngine::new(generator, bank, config.engine_config());
    eprintln!(
        "quizalign v{}: {} item(s) on \"{}\" for {} via {}",
        env!("CARGO_PKG_VERSION"),
        request.effective_count(),
        request.topic.trim(),
        request.class_label.trim(),
        engine.generator_name()
    );

    let outcome = match engine
        .generate_aligned_with_progress(&request, &ConsoleReporter)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            let response = serde_json::to_string_pretty(&e.to_response())
                .context("failed to serialize error response")?;
            println!("{response}");
            anyhow::bail!("{}: {e}", e.code());
        }
    };

    print_summary(&engine, &request, &outcome);

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let report = GenerationReport::new(request, engine.generator_name(), outcome);
    let path = output.join(report.file_name());
    report.save_json(&path)?;
    eprintln!("Report saved to: {}", path.display());

    Ok(())
}

fn print_summary(engine: &GenerationEngine, request: &GenerationRequest, outcome: &GenerationOutcome) {
    let ctx = engine.context(request);

    let mut table = Table::new();
    table.set_header(vec!["#", "Type", "Points", "Coverage", "Score", "Prompt"]);

    for (i, item) in outcome.questions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(item.kind),
            Cell::new(item.points),
            Cell::new(format!("{:.0}%", coverage_score(&item.prompt, &ctx.keywords) * 100.0)),
            Cell::new(format!("{:.2}", score_item(item, &ctx))),
            Cell::new(truncate(&item.prompt, 60)),
        ]);
    }

    eprintln!("\n{table}");
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars - 1).collect();
        format!("{head}…")
    }
}
