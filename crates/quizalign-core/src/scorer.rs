//! Continuous quality score used to rank accepted items.

use crate::align::AlignmentContext;
use crate::model::QuestionItem;
use crate::validator::{coverage_score, no_spoiler, readability_ok};

const COVERAGE_WEIGHT: f64 = 0.6;
const READABILITY_WEIGHT: f64 = 0.2;
const NO_SPOILER_WEIGHT: f64 = 0.2;

/// Weighted composite in `[0, 1]`: coverage dominates, readability and the
/// absence of spoilers add a fixed bonus each.
///
/// Items without a well-formed answer key get no spoiler bonus.
pub fn score_item(item: &QuestionItem, ctx: &AlignmentContext) -> f64 {
    let coverage = coverage_score(&item.prompt, &ctx.keywords);
    let readable = readability_ok(&item.prompt, &ctx.class_band);
    let clean = item
        .answer_key()
        .map(|key| no_spoiler(&item.prompt, &key))
        .unwrap_or(false);

    COVERAGE_WEIGHT * coverage
        + READABILITY_WEIGHT * f64::from(u8::from(readable))
        + NO_SPOILER_WEIGHT * f64::from(u8::from(clean))
}
