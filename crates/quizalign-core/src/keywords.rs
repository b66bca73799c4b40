//! Keyword extraction for a (subject, topic, description) triple.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ontology::KeywordBank;

/// Maximum number of keywords kept per alignment context.
pub const MAX_KEYWORDS: usize = 24;

/// How free-text tokens from topic and description are filtered.
///
/// In TOML: `token_filter = "stopwords"` or `token_filter = { min_length = 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFilter {
    /// Keep tokens strictly longer than this many characters.
    MinLength(usize),
    /// Drop tokens that appear in the bank's stopword set.
    Stopwords,
}

impl Default for TokenFilter {
    fn default() -> Self {
        TokenFilter::MinLength(3)
    }
}

impl TokenFilter {
    fn keeps(self, token: &str, bank: &KeywordBank) -> bool {
        match self {
            TokenFilter::MinLength(n) => token.chars().count() > n,
            TokenFilter::Stopwords => !bank.is_stopword(token),
        }
    }
}

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("punctuation pattern is valid"))
}

/// Lowercase `text`, turn punctuation into spaces and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    punctuation()
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Extract the ordered, duplicate-free keyword set for a request.
///
/// Unknown subjects are not an error: the result then comes from topic and
/// description tokens alone.
pub fn extract_keywords(
    bank: &KeywordBank,
    subject: &str,
    topic: &str,
    description: Option<&str>,
) -> Vec<String> {
    extract_keywords_with(bank, subject, topic, description, TokenFilter::default())
}

/// [`extract_keywords`] with an explicit token filter.
pub fn extract_keywords_with(
    bank: &KeywordBank,
    subject: &str,
    topic: &str,
    description: Option<&str>,
    filter: TokenFilter,
) -> Vec<String> {
    let seed = bank
        .subject(subject)
        .into_iter()
        .flat_map(|s| s.seed())
        .map(str::to_string);

    let free_text = format!("{topic} {}", description.unwrap_or_default());
    let extra = tokenize(&free_text)
        .into_iter()
        .filter(|t| filter.keeps(t, bank));

    let mut seen = HashSet::new();
    seed.chain(extra)
        .filter(|k| seen.insert(k.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> KeywordBank {
        KeywordBank::builtin().unwrap()
    }

    #[test]
    fn tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("L'equazione: 2x+5=13, già!"),
            vec!["l", "equazione", "2x", "5", "13", "già"]
        );
    }

    #[test]
    fn known_subject_seeds_from_bank() {
        let kws = extract_keywords(&bank(), "Matematica", "Equazioni di primo grado", None);
        assert_eq!(&kws[..4], &["equazione", "incognita", "primo grado", "bilanciare"]);
        assert!(kws.contains(&"x".to_string()));
        assert!(kws.contains(&"equazioni".to_string()));
        // "di" is too short, "primo" and "grado" survive as extra tokens
        assert!(!kws.contains(&"di".to_string()));
        assert!(kws.contains(&"grado".to_string()));
    }

    #[test]
    fn unknown_subject_uses_free_text_only() {
        let kws = extract_keywords(
            &bank(),
            "Astronomia",
            "Il sistema solare",
            Some("pianeti e orbite"),
        );
        assert_eq!(kws, vec!["sistema", "solare", "pianeti", "orbite"]);
    }

    #[test]
    fn output_is_capped_and_unique() {
        let long_description = (0..60)
            .map(|i| format!("parola{i} parola{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let kws = extract_keywords(&bank(), "Storia", "Roma antica", Some(&long_description));
        assert_eq!(kws.len(), MAX_KEYWORDS);
        let unique: HashSet<&String> = kws.iter().collect();
        assert_eq!(unique.len(), kws.len());
    }

    #[test]
    fn stopword_filter_keeps_short_content_words() {
        let kws = extract_keywords_with(
            &bank(),
            "Astronomia",
            "Il sole e la luna",
            None,
            TokenFilter::Stopwords,
        );
        assert_eq!(kws, vec!["sole", "luna"]);

        let short = extract_keywords_with(
            &bank(),
            "Astronomia",
            "Il sole e la luna",
            None,
            TokenFilter::MinLength(2),
        );
        assert_eq!(short, vec!["sole", "luna"]);
    }
}
