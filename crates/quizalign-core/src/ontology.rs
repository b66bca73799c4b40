//! Keyword bank loading.
//!
//! The bank is a static per-subject ontology read from TOML. It is built once
//! at process start and shared read-only (usually behind an `Arc`) with the
//! keyword extractor and anything else that needs it.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The bank shipped with the crate.
pub const BUILTIN_BANK: &str = include_str!("../ontology/keywords.toml");

/// Keywords for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectKeywords {
    /// Core vocabulary, in declaration order.
    pub base: Vec<String>,
    /// Related terms grouped by the keyword they expand.
    pub synonyms: Vec<SynonymGroup>,
}

impl SubjectKeywords {
    /// Base keywords followed by every synonym, in declaration order.
    pub fn seed(&self) -> impl Iterator<Item = &str> {
        self.base.iter().map(String::as_str).chain(
            self.synonyms
                .iter()
                .flat_map(|g| g.related.iter().map(String::as_str)),
        )
    }
}

/// Terms related to a single keyword.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SynonymGroup {
    pub keyword: String,
    #[serde(default)]
    pub related: Vec<String>,
}

/// Immutable keyword ontology plus the stopword set used by the extractor.
#[derive(Debug, Clone, Default)]
pub struct KeywordBank {
    subjects: HashMap<String, SubjectKeywords>,
    stopwords: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    stopwords: Vec<String>,
    #[serde(default)]
    subjects: HashMap<String, TomlSubject>,
}

#[derive(Debug, Deserialize)]
struct TomlSubject {
    #[serde(default)]
    base: Vec<String>,
    #[serde(default)]
    synonyms: Vec<SynonymGroup>,
}

impl KeywordBank {
    /// Parse the bank embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_BANK, Path::new("<builtin>"))
    }

    /// Load a bank from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read keyword bank: {}", path.display()))?;
        Self::from_toml_str(&content, path)
    }

    /// Parse a TOML string into a bank (useful for testing).
    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: TomlBankFile = toml::from_str(content)
            .with_context(|| format!("failed to parse keyword bank: {}", source_path.display()))?;

        let subjects = parsed
            .subjects
            .into_iter()
            .map(|(name, s)| {
                (
                    normalize_subject(&name),
                    SubjectKeywords {
                        base: s.base,
                        synonyms: s.synonyms,
                    },
                )
            })
            .collect();

        let stopwords = parsed
            .stopwords
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();

        Ok(Self {
            subjects,
            stopwords,
        })
    }

    /// Keywords for a subject; lookup is case- and whitespace-insensitive.
    pub fn subject(&self, subject: &str) -> Option<&SubjectKeywords> {
        self.subjects.get(&normalize_subject(subject))
    }

    /// Whether `word` (already lowercased) is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Known subject names, sorted.
    pub fn subjects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.subjects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn normalize_subject(subject: &str) -> String {
    subject.trim().to_lowercase()
}
