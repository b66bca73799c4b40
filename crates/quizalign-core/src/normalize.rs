//! Normalization of raw generated items.

use crate::model::{QuestionItem, QuestionType, MCQ_OPTION_COUNT};

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to detect duplicate prompts: lowercased, whitespace-collapsed.
pub fn prompt_key(prompt: &str) -> String {
    collapse_whitespace(&prompt.to_lowercase())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize an item straight out of the generator.
///
/// The prompt is trimmed with internal whitespace collapsed. MCQ options are
/// trimmed and capitalized, and lists shorter than four are padded with
/// placeholder options. Applying this twice gives the same item as applying
/// it once.
pub fn post_process(mut item: QuestionItem) -> QuestionItem {
    item.prompt = collapse_whitespace(&item.prompt);

    if item.kind == QuestionType::Mcq {
        if let Some(options) = item.options.as_mut() {
            for option in options.iter_mut() {
                *option = capitalize(option.trim());
            }
            while options.len() < MCQ_OPTION_COUNT {
                options.push(format!("Opzione {}", options.len() + 1));
            }
        }
    }

    item
}
