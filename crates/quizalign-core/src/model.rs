//! Core data model types for quizalign.
//!
//! These are the fundamental types that the whole pipeline uses to represent
//! generated quiz items, their answer keys, and caller requests. Field names
//! on the wire follow the JSON shape the generation capability is asked to
//! produce (`type`, `prompt`, `options`, `correctAnswer`, `points`,
//! `explainForTeacher`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of characters a prompt must have.
pub const MIN_PROMPT_CHARS: usize = 10;

/// Number of options an MCQ item must carry.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Inclusive range of legal point values.
pub const POINTS_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Bounds on how many items a single request may ask for.
pub const MIN_COUNT: usize = 3;
pub const MAX_COUNT: usize = 10;
pub const DEFAULT_COUNT: usize = 5;

/// The kind of a quiz item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "TF")]
    TrueFalse,
    #[serde(rename = "SHORT")]
    Short,
    #[serde(rename = "LONG")]
    Long,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Mcq => write!(f, "MCQ"),
            QuestionType::TrueFalse => write!(f, "TF"),
            QuestionType::Short => write!(f, "SHORT"),
            QuestionType::Long => write!(f, "LONG"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MCQ" => Ok(QuestionType::Mcq),
            "TF" => Ok(QuestionType::TrueFalse),
            "SHORT" => Ok(QuestionType::Short),
            "LONG" => Ok(QuestionType::Long),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// The correct answer as it appears on the wire.
///
/// Which variant is legal depends on the item's [`QuestionType`]; see
/// [`QuestionItem::answer_key`] for the checked view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    /// Index into `options` (MCQ).
    Selected { selected: i64 },
    /// Truth value (TF).
    Value { value: bool },
    /// Expected text (SHORT, optionally LONG).
    Expected { expected: String },
}

/// A single generated quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    /// The kind of item.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// The text shown to the student.
    pub prompt: String,
    /// Answer options; MCQ only, exactly four.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// The correct answer, shaped according to `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswer>,
    /// Points awarded, 1..=10.
    #[serde(default = "default_points")]
    pub points: i64,
    /// Optional note for the teacher.
    #[serde(
        default,
        rename = "explainForTeacher",
        skip_serializing_if = "Option::is_none"
    )]
    pub teacher_explanation: Option<String>,
}

fn default_points() -> i64 {
    1
}

/// Typed view of an item's answer, built by exhaustive matching on the item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey<'a> {
    Mcq { options: &'a [String], correct: usize },
    TrueFalse(bool),
    Short(&'a str),
    Long(Option<&'a str>),
}

impl AnswerKey<'_> {
    /// The answer text that must not leak into the prompt, if any.
    pub fn revealing_text(&self) -> Option<&str> {
        match self {
            AnswerKey::Mcq { options, correct } => options.get(*correct).map(String::as_str),
            AnswerKey::Short(expected) => Some(expected),
            AnswerKey::TrueFalse(_) | AnswerKey::Long(_) => None,
        }
    }
}

/// Why an item does not satisfy the structural schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    PromptTooShort(usize),
    PointsOutOfRange(i64),
    OptionCount(usize),
    EmptyOption,
    UnexpectedOptions(QuestionType),
    MissingAnswer(QuestionType),
    AnswerShape(QuestionType),
    SelectedOutOfRange(i64),
    EmptyExpected,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::PromptTooShort(n) => {
                write!(f, "prompt has {n} chars, need at least {MIN_PROMPT_CHARS}")
            }
            SchemaViolation::PointsOutOfRange(p) => write!(f, "points {p} outside 1..=10"),
            SchemaViolation::OptionCount(n) => {
                write!(f, "MCQ needs {MCQ_OPTION_COUNT} options, got {n}")
            }
            SchemaViolation::EmptyOption => write!(f, "MCQ option is empty"),
            SchemaViolation::UnexpectedOptions(t) => write!(f, "{t} items take no options"),
            SchemaViolation::MissingAnswer(t) => write!(f, "{t} item has no correct answer"),
            SchemaViolation::AnswerShape(t) => write!(f, "wrong answer shape for {t}"),
            SchemaViolation::SelectedOutOfRange(i) => write!(f, "selected index {i} outside 0..=3"),
            SchemaViolation::EmptyExpected => write!(f, "expected answer is empty"),
        }
    }
}

impl QuestionItem {
    /// Check the structural invariants and return the typed answer key.
    pub fn answer_key(&self) -> Result<AnswerKey<'_>, SchemaViolation> {
        let prompt_chars = self.prompt.chars().count();
        if prompt_chars < MIN_PROMPT_CHARS {
            return Err(SchemaViolation::PromptTooShort(prompt_chars));
        }
        if !POINTS_RANGE.contains(&self.points) {
            return Err(SchemaViolation::PointsOutOfRange(self.points));
        }

        match self.kind {
            QuestionType::Mcq => {
                let options = self
                    .options
                    .as_deref()
                    .ok_or(SchemaViolation::OptionCount(0))?;
                if options.len() != MCQ_OPTION_COUNT {
                    return Err(SchemaViolation::OptionCount(options.len()));
                }
                if options.iter().any(|o| o.trim().is_empty()) {
                    return Err(SchemaViolation::EmptyOption);
                }
                match &self.correct_answer {
                    Some(CorrectAnswer::Selected { selected }) => {
                        if (0..MCQ_OPTION_COUNT as i64).contains(selected) {
                            Ok(AnswerKey::Mcq {
                                options,
                                correct: *selected as usize,
                            })
                        } else {
                            Err(SchemaViolation::SelectedOutOfRange(*selected))
                        }
                    }
                    Some(_) => Err(SchemaViolation::AnswerShape(self.kind)),
                    None => Err(SchemaViolation::MissingAnswer(self.kind)),
                }
            }
            QuestionType::TrueFalse => {
                self.reject_options()?;
                match &self.correct_answer {
                    Some(CorrectAnswer::Value { value }) => Ok(AnswerKey::TrueFalse(*value)),
                    Some(_) => Err(SchemaViolation::AnswerShape(self.kind)),
                    None => Err(SchemaViolation::MissingAnswer(self.kind)),
                }
            }
            QuestionType::Short => {
                self.reject_options()?;
                match &self.correct_answer {
                    Some(CorrectAnswer::Expected { expected }) if expected.trim().is_empty() => {
                        Err(SchemaViolation::EmptyExpected)
                    }
                    Some(CorrectAnswer::Expected { expected }) => Ok(AnswerKey::Short(expected)),
                    Some(_) => Err(SchemaViolation::AnswerShape(self.kind)),
                    None => Err(SchemaViolation::MissingAnswer(self.kind)),
                }
            }
            QuestionType::Long => {
                self.reject_options()?;
                match &self.correct_answer {
                    Some(CorrectAnswer::Expected { expected }) => {
                        Ok(AnswerKey::Long(Some(expected.as_str())))
                    }
                    Some(_) => Err(SchemaViolation::AnswerShape(self.kind)),
                    None => Ok(AnswerKey::Long(None)),
                }
            }
        }
    }

    fn reject_options(&self) -> Result<(), SchemaViolation> {
        match &self.options {
            Some(options) if !options.is_empty() => {
                Err(SchemaViolation::UnexpectedOptions(self.kind))
            }
            _ => Ok(()),
        }
    }
}

/// Requested difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Default point value for items of this difficulty.
    pub fn default_points(self) -> i64 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A caller's request for aligned items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub subject: String,
    pub topic: String,
    pub class_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Number of items wanted; clamped to `MIN_COUNT..=MAX_COUNT`.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Enforce a type distribution.
    #[serde(default = "default_true")]
    pub mix: bool,
    /// Enforce the aggregate acceptance gate.
    #[serde(default = "default_true")]
    pub strict: bool,
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_true() -> bool {
    true
}

impl GenerationRequest {
    /// A request with default difficulty, count, mix and strict settings.
    pub fn new(subject: &str, topic: &str, class_label: &str) -> Self {
        Self {
            subject: subject.to_string(),
            topic: topic.to_string(),
            class_label: class_label.to_string(),
            description: None,
            difficulty: Difficulty::default(),
            count: DEFAULT_COUNT,
            mix: true,
            strict: true,
        }
    }

    /// The requested count clamped to the legal range.
    pub fn effective_count(&self) -> usize {
        self.count.clamp(MIN_COUNT, MAX_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(prompt: &str, options: &[&str], selected: i64) -> QuestionItem {
        QuestionItem {
            kind: QuestionType::Mcq,
            prompt: prompt.into(),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            correct_answer: Some(CorrectAnswer::Selected { selected }),
            points: 1,
            teacher_explanation: None,
        }
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::Mcq.to_string(), "MCQ");
        assert_eq!("tf".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert_eq!("SHORT".parse::<QuestionType>().unwrap(), QuestionType::Short);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn deserialize_wire_format() {
        let json = r#"{
            "type": "MCQ",
            "prompt": "Risolvi l'equazione 2x + 5 = 13",
            "options": ["x = 2", "x = 4", "x = 6", "x = 8"],
            "correctAnswer": {"selected": 1},
            "points": 2,
            "explainForTeacher": "Equazione lineare"
        }"#;
        let item: QuestionItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, QuestionType::Mcq);
        assert_eq!(
            item.correct_answer,
            Some(CorrectAnswer::Selected { selected: 1 })
        );
        assert_eq!(item.teacher_explanation.as_deref(), Some("Equazione lineare"));
    }

    #[test]
    fn points_default_to_one() {
        let json = r#"{"type": "TF", "prompt": "La clorofilla è verde", "correctAnswer": {"value": true}}"#;
        let item: QuestionItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.points, 1);
        assert_eq!(item.answer_key().unwrap(), AnswerKey::TrueFalse(true));
    }

    #[test]
    fn answer_key_mcq() {
        let item = mcq("Quale numero è il maggiore?", &["12", "8", "15", "9"], 2);
        let key = item.answer_key().unwrap();
        assert_eq!(key.revealing_text(), Some("15"));
    }

    #[test]
    fn answer_key_rejects_wrong_shapes() {
        let three = mcq("Quale numero è il maggiore?", &["12", "8", "15"], 0);
        assert_eq!(three.answer_key(), Err(SchemaViolation::OptionCount(3)));

        let out_of_range = mcq("Quale numero è il maggiore?", &["1", "2", "3", "4"], 4);
        assert_eq!(
            out_of_range.answer_key(),
            Err(SchemaViolation::SelectedOutOfRange(4))
        );

        let mut tf_with_text = mcq("Vero o falso: il sole è una stella", &[], 0);
        tf_with_text.kind = QuestionType::TrueFalse;
        tf_with_text.options = None;
        tf_with_text.correct_answer = Some(CorrectAnswer::Expected {
            expected: "vero".into(),
        });
        assert_eq!(
            tf_with_text.answer_key(),
            Err(SchemaViolation::AnswerShape(QuestionType::TrueFalse))
        );
    }

    #[test]
    fn answer_key_checks_prompt_and_points() {
        let short = mcq("Breve?", &["a", "b", "c", "d"], 0);
        assert!(matches!(
            short.answer_key(),
            Err(SchemaViolation::PromptTooShort(6))
        ));

        let mut heavy = mcq("Quale numero è il maggiore?", &["1", "2", "3", "4"], 0);
        heavy.points = 11;
        assert_eq!(heavy.answer_key(), Err(SchemaViolation::PointsOutOfRange(11)));
    }

    #[test]
    fn long_answer_is_optional() {
        let item = QuestionItem {
            kind: QuestionType::Long,
            prompt: "Descrivi il sistema feudale del Medioevo".into(),
            options: None,
            correct_answer: None,
            points: 4,
            teacher_explanation: None,
        };
        assert_eq!(item.answer_key().unwrap(), AnswerKey::Long(None));
    }

    #[test]
    fn request_defaults_and_clamp() {
        let json = r#"{"subject": "Matematica", "topic": "Frazioni", "classLabel": "2ª media"}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.difficulty, Difficulty::Medium);
        assert_eq!(req.count, 5);
        assert!(req.mix);
        assert!(req.strict);

        let mut big = req.clone();
        big.count = 40;
        assert_eq!(big.effective_count(), 10);
        big.count = 0;
        assert_eq!(big.effective_count(), 3);
    }

    #[test]
    fn difficulty_points() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Easy.default_points(), 1);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }
}
