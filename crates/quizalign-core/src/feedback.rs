//! Corrective instructions sent back to the generator between attempts.
//!
//! The text is Italian because it is spliced into the generator prompt.

use std::collections::BTreeSet;

use crate::align::AlignmentContext;
use crate::band::Band;
use crate::model::Difficulty;
use crate::validator::ReasonKind;

/// Sent after a batch that could not be parsed.
pub const MALFORMED_BATCH_FEEDBACK: &str =
    "Rispondi SOLO con JSON conforme allo schema. Nessun testo esterno.";

/// Sent after a failed or timed-out call.
pub const CAPABILITY_ERROR_FEEDBACK: &str =
    "Errore nella generazione. Riprova con formato JSON valido.";

/// Keywords named in feedback.
const FEEDBACK_KEYWORDS: usize = 6;

/// Build feedback from the reason kinds seen in the last attempt.
pub fn build_feedback(ctx: &AlignmentContext, kinds: &BTreeSet<ReasonKind>) -> String {
    let avoid = kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut parts = vec![format!(
        "Rendi le domande più pertinenti a \"{}\" (classe {}); includi keyword: {}; evita: {}",
        ctx.topic,
        ctx.class_label,
        ctx.top_keywords(FEEDBACK_KEYWORDS).join(", "),
        avoid,
    )];

    if kinds.contains(&ReasonKind::Spoiler) {
        parts.push("Non includere la risposta corretta nel testo della domanda".into());
    }
    if kinds.contains(&ReasonKind::Readability) {
        parts.push(format!(
            "Semplifica il lessico per la scuola {}: massimo {} parole per domanda, lessico {}",
            ctx.class_band.band.label(),
            ctx.class_band.max_prompt_words,
            ctx.class_band.lexicon,
        ));
    }
    if kinds.contains(&ReasonKind::OptionsDuplicates) {
        parts.push("Le quattro opzioni devono essere tutte diverse".into());
    }
    if ctx.class_band.band == Band::Primary && ctx.difficulty == Difficulty::Easy {
        parts.push("Usa numeri piccoli (< 20) e concetti di base".into());
    }

    format!("{}.", parts.join(". "))
}

/// Suggestion attached to a `MISALIGNED` failure.
pub fn remediation(ctx: &AlignmentContext) -> String {
    let mut suggestion = String::from(
        "Non è stato possibile generare domande allineate. \
         Prova a rendere più specifici Argomento e Descrizione",
    );
    if ctx.description.is_none() {
        suggestion.push_str(", ad esempio aggiungendo una descrizione");
    }
    suggestion.push('.');
    suggestion
}
