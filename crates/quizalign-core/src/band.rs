//! Class-band classification.
//!
//! Maps a free-text class label ("2ª media", "1ª elementare", "4° liceo") to a
//! pedagogical band and the readability policy that goes with it.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pedagogical grade grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Primary,
    Middle,
    Secondary,
}

impl Band {
    /// Italian name used in prompts and feedback.
    pub fn label(self) -> &'static str {
        match self {
            Band::Primary => "primaria",
            Band::Middle => "media",
            Band::Secondary => "superiore",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Primary => write!(f, "primary"),
            Band::Middle => write!(f, "middle"),
            Band::Secondary => write!(f, "secondary"),
        }
    }
}

/// Lexical complexity expected for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lexicon {
    Base,
    Medio,
    Avanzato,
}

impl fmt::Display for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexicon::Base => write!(f, "base"),
            Lexicon::Medio => write!(f, "medio"),
            Lexicon::Avanzato => write!(f, "avanzato"),
        }
    }
}

/// A band together with its readability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBand {
    pub band: Band,
    pub max_prompt_words: usize,
    pub lexicon: Lexicon,
    pub min_age: u8,
    pub max_age: u8,
}

impl ClassBand {
    pub const PRIMARY: ClassBand = ClassBand {
        band: Band::Primary,
        max_prompt_words: 30,
        lexicon: Lexicon::Base,
        min_age: 6,
        max_age: 11,
    };

    pub const MIDDLE: ClassBand = ClassBand {
        band: Band::Middle,
        max_prompt_words: 45,
        lexicon: Lexicon::Medio,
        min_age: 11,
        max_age: 14,
    };

    pub const SECONDARY: ClassBand = ClassBand {
        band: Band::Secondary,
        max_prompt_words: 60,
        lexicon: Lexicon::Avanzato,
        min_age: 14,
        max_age: 19,
    };

    pub fn for_band(band: Band) -> Self {
        match band {
            Band::Primary => Self::PRIMARY,
            Band::Middle => Self::MIDDLE,
            Band::Secondary => Self::SECONDARY,
        }
    }
}

const PRIMARY_MARKERS: &[&str] = &["elementare", "elementari", "primaria"];
const MIDDLE_MARKERS: &[&str] = &["media", "medie"];
const SECONDARY_MARKERS: &[&str] = &["superiore", "superiori", "liceo", "istituto"];

fn grade_ordinal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\p{N}])[1-5](?:[aª°º])?(?:$|[^\p{L}\p{N}])")
            .expect("grade ordinal pattern is valid")
    })
}

/// Classify a class label. Every input maps to a band; secondary is the fallback.
///
/// Explicit school markers are checked before the grade ordinal, so
/// "2a media" is middle school while "2a" alone is primary. A label that
/// starts with an ordinal is not enough to make it primary.
pub fn classify(class_label: &str) -> ClassBand {
    let label = class_label.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| label.contains(m));

    let band = if has_any(PRIMARY_MARKERS) {
        Band::Primary
    } else if has_any(MIDDLE_MARKERS) {
        Band::Middle
    } else if has_any(SECONDARY_MARKERS) {
        Band::Secondary
    } else if grade_ordinal().is_match(&label) {
        Band::Primary
    } else {
        Band::Secondary
    };

    ClassBand::for_band(band)
}
