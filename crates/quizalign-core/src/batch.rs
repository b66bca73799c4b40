//! Decoding of raw generator batches.

use serde_json::Value;

use crate::model::{QuestionItem, MAX_COUNT};

/// A candidate as decoded from the batch: either a typed item, or the reason
/// the element could not be read as one.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Item(QuestionItem),
    Undecodable(String),
}

/// Why a whole batch was unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("response is not a JSON object: {0}")]
    NotJson(String),
    #[error("missing `questions` array")]
    MissingQuestions,
    #[error("`questions` array is empty")]
    Empty,
    #[error("`questions` has {0} entries, at most {MAX_COUNT} allowed")]
    TooMany(usize),
    #[error("`questions` entry {0} is not an object")]
    NotAnObject(usize),
}

/// Parse the extracted JSON text into candidates.
///
/// The batch must be an object whose `questions` field is a non-empty array
/// of objects with at most [`MAX_COUNT`] entries. Elements that are objects
/// but not valid items become [`Candidate::Undecodable`] so they can be
/// rejected individually.
pub fn parse_batch(json: &str) -> Result<Vec<Candidate>, BatchError> {
    let value: Value =
        serde_json::from_str(json.trim()).map_err(|e| BatchError::NotJson(e.to_string()))?;
    let questions = value
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(BatchError::MissingQuestions)?;

    if questions.is_empty() {
        return Err(BatchError::Empty);
    }
    if questions.len() > MAX_COUNT {
        return Err(BatchError::TooMany(questions.len()));
    }
    if let Some(index) = questions.iter().position(|q| !q.is_object()) {
        return Err(BatchError::NotAnObject(index));
    }

    Ok(questions
        .iter()
        .map(|q| match serde_json::from_value::<QuestionItem>(q.clone()) {
            Ok(item) => Candidate::Item(item),
            Err(e) => Candidate::Undecodable(e.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    #[test]
    fn parses_items_and_flags_bad_ones() {
        let json = r#"{"questions": [
            {"type": "TF", "prompt": "Il sole è una stella?", "correctAnswer": {"value": true}},
            {"type": "ESSAY", "prompt": "Scrivi un tema"}
        ]}"#;
        let candidates = parse_batch(json).unwrap();
        assert_eq!(candidates.len(), 2);
        match &candidates[0] {
            Candidate::Item(item) => {
                assert_eq!(item.kind, QuestionType::TrueFalse);
                assert_eq!(item.points, 1);
            }
            other => panic!("expected item, got {other:?}"),
        }
        assert!(matches!(candidates[1], Candidate::Undecodable(_)));
    }

    #[test]
    fn rejects_malformed_batches() {
        assert!(matches!(parse_batch("non json"), Err(BatchError::NotJson(_))));
        assert_eq!(parse_batch(r#"{"items": []}"#), Err(BatchError::MissingQuestions));
        assert_eq!(parse_batch(r#"{"questions": []}"#), Err(BatchError::Empty));
        assert_eq!(
            parse_batch(r#"{"questions": [{}, 3]}"#),
            Err(BatchError::NotAnObject(1))
        );
    }

    #[test]
    fn rejects_oversized_batches() {
        let items = vec![r#"{"type": "TF"}"#; 11].join(",");
        let json = format!(r#"{{"questions": [{items}]}}"#);
        assert_eq!(parse_batch(&json), Err(BatchError::TooMany(11)));
    }
}
