//! Per-item validation.
//!
//! Every check is a pure function of one item and the shared, read-only
//! [`AlignmentContext`], so items can be validated independently.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::align::AlignmentContext;
use crate::band::{Band, ClassBand};
use crate::model::{AnswerKey, QuestionItem};

/// Only this many keywords are considered when measuring coverage.
pub const COVERAGE_WINDOW: usize = 12;

/// Why an item was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RejectReason {
    Schema,
    /// Coverage below threshold, in whole percent (truncated).
    Coverage(u32),
    Readability,
    Spoiler,
    OptionsDuplicates,
}

/// Reason codes without their parameters, for counting and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonKind {
    Schema,
    Coverage,
    Readability,
    Spoiler,
    OptionsDuplicates,
}

impl RejectReason {
    pub fn kind(&self) -> ReasonKind {
        match self {
            RejectReason::Schema => ReasonKind::Schema,
            RejectReason::Coverage(_) => ReasonKind::Coverage,
            RejectReason::Readability => ReasonKind::Readability,
            RejectReason::Spoiler => ReasonKind::Spoiler,
            RejectReason::OptionsDuplicates => ReasonKind::OptionsDuplicates,
        }
    }
}

impl fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonKind::Schema => write!(f, "schema"),
            ReasonKind::Coverage => write!(f, "coverage"),
            ReasonKind::Readability => write!(f, "readability"),
            ReasonKind::Spoiler => write!(f, "spoiler"),
            ReasonKind::OptionsDuplicates => write!(f, "options-duplicates"),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Coverage(pct) => write!(f, "coverage:{pct}%"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of validating one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub ok: bool,
    pub reasons: Vec<RejectReason>,
}

impl ValidationVerdict {
    fn from_reasons(reasons: Vec<RejectReason>) -> Self {
        Self {
            ok: reasons.is_empty(),
            reasons,
        }
    }

    /// A verdict for a candidate that could not even be decoded.
    pub fn schema_failure() -> Self {
        Self::from_reasons(vec![RejectReason::Schema])
    }
}

/// Fraction of the first [`COVERAGE_WINDOW`] keywords found in `text`.
///
/// Matching is case-insensitive substring search. An empty keyword set has
/// zero coverage.
pub fn coverage_score(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let window = &keywords[..keywords.len().min(COVERAGE_WINDOW)];
    let hits = window
        .iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .count();
    hits as f64 / window.len() as f64
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether `text` fits the band's readability policy.
pub fn readability_ok(text: &str, class_band: &ClassBand) -> bool {
    if word_count(text) > class_band.max_prompt_words {
        return false;
    }
    // Younger students get no stacked punctuation like ";;" or ":;".
    class_band.band != Band::Primary || !has_punctuation_run(text)
}

fn has_punctuation_run(text: &str) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if c == ';' || c == ':' {
            run += 1;
            if run >= 2 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Whether the answer text stays out of the prompt. TF and LONG always pass.
pub fn no_spoiler(prompt: &str, key: &AnswerKey<'_>) -> bool {
    match key.revealing_text() {
        Some(answer) => {
            let answer = answer.trim().to_lowercase();
            answer.is_empty() || !prompt.to_lowercase().contains(&answer)
        }
        None => true,
    }
}

/// Whether all MCQ options are pairwise distinct.
pub fn options_unique(options: &[String]) -> bool {
    let distinct: HashSet<&str> = options.iter().map(String::as_str).collect();
    distinct.len() == options.len()
}

/// Validate a single item against the alignment context.
///
/// All checks run and their reasons accumulate in order: schema, coverage,
/// readability, spoiler, option uniqueness. The last two need a well-formed
/// answer key and are skipped when the schema check fails.
pub fn validate_item(item: &QuestionItem, ctx: &AlignmentContext) -> ValidationVerdict {
    let mut reasons = Vec::new();

    let key = item.answer_key();
    if key.is_err() {
        reasons.push(RejectReason::Schema);
    }

    let coverage = coverage_score(&item.prompt, &ctx.keywords);
    if coverage < ctx.min_item_coverage {
        reasons.push(RejectReason::Coverage((coverage * 100.0) as u32));
    }

    if !readability_ok(&item.prompt, &ctx.class_band) {
        reasons.push(RejectReason::Readability);
    }

    if let Ok(key) = key {
        if !no_spoiler(&item.prompt, &key) {
            reasons.push(RejectReason::Spoiler);
        }
        if let AnswerKey::Mcq { options, .. } = key {
            if !options_unique(options) {
                reasons.push(RejectReason::OptionsDuplicates);
            }
        }
    }

    ValidationVerdict::from_reasons(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignmentPolicy;
    use crate::model::{CorrectAnswer, GenerationRequest, QuestionType};
    use crate::ontology::KeywordBank;

    fn ctx(class_label: &str) -> AlignmentContext {
        let bank = KeywordBank::builtin().unwrap();
        let request = GenerationRequest::new("Matematica", "Equazioni di primo grado", class_label);
        AlignmentContext::build(&bank, &request, &AlignmentPolicy::default())
    }

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    /// A prompt naming every keyword in the coverage window.
    fn covered_prompt(extra: &str) -> String {
        format!(
            "{extra} Usa equazione, incognita, primo grado, bilanciare, uguaglianza, \
             frazione, denominatore, numeratore, risolvi, uguale, soluzione."
        )
    }

    fn mcq(prompt: &str, options: [&str; 4], selected: i64) -> QuestionItem {
        QuestionItem {
            kind: QuestionType::Mcq,
            prompt: prompt.into(),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            correct_answer: Some(CorrectAnswer::Selected { selected }),
            points: 2,
            teacher_explanation: None,
        }
    }

    #[test]
    fn coverage_counts_first_twelve_only() {
        let keywords = kws(&[
            "a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "a10", "a11", "a12", "zz",
        ]);
        assert_eq!(coverage_score("zz", &keywords), 0.0);
        let all: String = keywords.join(" ");
        assert_eq!(coverage_score(&all, &keywords), 1.0);
    }

    #[test]
    fn coverage_edge_cases() {
        assert_eq!(coverage_score("qualunque testo", &[]), 0.0);
        assert_eq!(coverage_score("La FOTOSINTESI", &kws(&["fotosintesi"])), 1.0);
        assert_eq!(coverage_score("niente", &kws(&["uno", "due"])), 0.0);
        assert_eq!(coverage_score("uno e basta", &kws(&["uno", "due"])), 0.5);
    }

    #[test]
    fn readability_limits() {
        let middle = ClassBand::MIDDLE;
        let primary = ClassBand::PRIMARY;
        let forty = vec!["parola"; 40].join(" ");
        assert!(readability_ok(&forty, &middle));
        assert!(!readability_ok(&forty, &primary));
        assert!(!readability_ok("Completa:: la frase", &primary));
        assert!(readability_ok("Completa:: la frase", &middle));
    }

    #[test]
    fn valid_mcq_passes() {
        let ctx = ctx("2ª media");
        let item = mcq(&covered_prompt("Risolvi 2x + 5 = 13."), ["x = 2", "x = 4", "x = 6", "x = 8"], 1);
        let verdict = validate_item(&item, &ctx);
        assert!(verdict.ok, "unexpected reasons: {:?}", verdict.reasons);
    }

    #[test]
    fn spoiler_is_rejected() {
        let ctx = ctx("2ª media");
        let item = mcq(
            &covered_prompt("Sapendo che x = 4, risolvi 2x + 5 = 13."),
            ["x = 2", "x = 4", "x = 6", "x = 8"],
            1,
        );
        let verdict = validate_item(&item, &ctx);
        assert_eq!(verdict.reasons, vec![RejectReason::Spoiler]);
    }

    #[test]
    fn short_answer_spoiler() {
        let ctx = ctx("2ª media");
        let item = QuestionItem {
            kind: QuestionType::Short,
            prompt: covered_prompt("Il valore è 7: scrivi il valore."),
            options: None,
            correct_answer: Some(CorrectAnswer::Expected { expected: "7".into() }),
            points: 2,
            teacher_explanation: None,
        };
        assert_eq!(validate_item(&item, &ctx).reasons, vec![RejectReason::Spoiler]);
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let ctx = ctx("2ª media");
        let item = mcq(&covered_prompt("Risolvi 2x + 5 = 13."), ["x = 2", "x = 4", "x = 4", "x = 8"], 0);
        assert_eq!(
            validate_item(&item, &ctx).reasons,
            vec![RejectReason::OptionsDuplicates]
        );
    }

    #[test]
    fn reasons_accumulate_in_order() {
        let ctx = ctx("1ª elementare");
        let long_prompt = vec!["testo"; 50].join(" ");
        let mut item = mcq(&long_prompt, ["a", "b", "c", "d"], 0);
        item.points = 0;
        let verdict = validate_item(&item, &ctx);
        assert!(!verdict.ok);
        assert_eq!(
            verdict.reasons,
            vec![
                RejectReason::Schema,
                RejectReason::Coverage(0),
                RejectReason::Readability
            ]
        );
    }

    #[test]
    fn reason_codes_render() {
        assert_eq!(RejectReason::Coverage(41).to_string(), "coverage:41%");
        assert_eq!(RejectReason::OptionsDuplicates.to_string(), "options-duplicates");
        let json = serde_json::to_string(&vec![RejectReason::Spoiler, RejectReason::Coverage(9)]).unwrap();
        assert_eq!(json, r#"["spoiler","coverage:9%"]"#);
    }

    #[test]
    fn tf_and_long_are_spoiler_exempt() {
        let ctx = ctx("2ª media");
        let item = QuestionItem {
            kind: QuestionType::TrueFalse,
            prompt: covered_prompt("Vero o falso: x vale true."),
            options: None,
            correct_answer: Some(CorrectAnswer::Value { value: true }),
            points: 1,
            teacher_explanation: None,
        };
        assert!(validate_item(&item, &ctx).ok);
    }
}
