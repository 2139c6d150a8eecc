//! Parser for raw model output.
//!
//! The payload must be a JSON array of objects. Individual fields are
//! lenient: a missing or non-string field becomes `"Unknown"`. Shape errors
//! (not JSON, not an array, an element that is not an object) fail the whole
//! parse; there are no partial results.

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Correction, UNKNOWN};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("LLM response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("LLM response should be a JSON list, got {0}")]
    NotAList(&'static str),

    #[error("item at index {index} is not an object: {item}")]
    NotAnObject { index: usize, item: String },
}

/// Parse raw model output into an ordered list of corrections.
pub fn parse_corrections(raw_text: &str) -> Result<Vec<Correction>, ParseError> {
    let payload = strip_code_fence(raw_text);
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(ParseError::NotAList(kind_of(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(correction_from_fields(&fields)),
            other => Err(ParseError::NotAnObject {
                index,
                item: other.to_string(),
            }),
        })
        .collect()
}

fn correction_from_fields(fields: &Map<String, Value>) -> Correction {
    Correction {
        wrong_sentence: field_or_unknown(fields, "wrong_sentence"),
        corrected_sentence: field_or_unknown(fields, "corrected_sentence"),
        error_type: field_or_unknown(fields, "error_type"),
    }
}

/// String value of `key`, or `"Unknown"` when absent or not a string.
pub fn field_or_unknown(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => UNKNOWN.to_string(),
    }
}

/// Remove a single surrounding Markdown code fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn preserves_fields_and_order() {
        let raw = r#"[
            {"wrong_sentence": "He are going to the store.",
             "corrected_sentence": "He is going to the store.",
             "error_type": "Subject-Verb Agreement"},
            {"wrong_sentence": "She walk to school everyday.",
             "corrected_sentence": "She walks to school every day.",
             "error_type": "Subject-verb agreement"},
            {"wrong_sentence": "I has a dog.",
             "corrected_sentence": "I have a dog.",
             "error_type": "Verb tense"}
        ]"#;

        let parsed = assert_ok!(parse_corrections(raw));
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].wrong_sentence, "He are going to the store.");
        assert_eq!(parsed[0].error_type, "Subject-Verb Agreement");
        assert_eq!(parsed[1].corrected_sentence, "She walks to school every day.");
        assert_eq!(parsed[2].wrong_sentence, "I has a dog.");
    }

    #[test]
    fn empty_array_means_no_errors() {
        assert_eq!(parse_corrections("[]").unwrap(), Vec::new());
    }

    #[test]
    fn missing_or_mistyped_fields_become_unknown() {
        let raw = r#"[{"wrong_sentence": "x", "error_type": 7}, {}]"#;
        let parsed = parse_corrections(raw).unwrap();

        assert_eq!(parsed[0].wrong_sentence, "x");
        assert_eq!(parsed[0].corrected_sentence, UNKNOWN);
        assert_eq!(parsed[0].error_type, UNKNOWN);
        assert_eq!(
            parsed[1],
            Correction {
                wrong_sentence: UNKNOWN.to_string(),
                corrected_sentence: UNKNOWN.to_string(),
                error_type: UNKNOWN.to_string(),
            }
        );
    }

    #[test]
    fn invalid_json_fails() {
        let err = assert_err!(parse_corrections("Sure! Here are the errors:"));
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn single_object_is_wrong_shape() {
        let raw =
            r#"{"wrong_sentence": "a", "corrected_sentence": "b", "error_type": "Word choice"}"#;
        assert_eq!(
            parse_corrections(raw).unwrap_err(),
            ParseError::NotAList("an object")
        );
    }

    #[test]
    fn non_object_element_fails_whole_parse() {
        let raw = r#"[{"wrong_sentence": "a"}, "oops"]"#;
        let err = parse_corrections(raw).unwrap_err();
        assert_eq!(
            err,
            ParseError::NotAnObject {
                index: 1,
                item: "\"oops\"".to_string()
            }
        );
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n[{\"wrong_sentence\": \"a\", \"corrected_sentence\": \"b\", \
                   \"error_type\": \"Word choice\"}]\n```";
        let parsed = parse_corrections(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].corrected_sentence, "b");

        assert_eq!(parse_corrections("  ```\n[]\n```  ").unwrap(), Vec::new());
    }

    #[test]
    fn strips_single_line_fence_with_info_string() {
        assert_eq!(parse_corrections("```json []```").unwrap(), Vec::new());
        assert_eq!(parse_corrections("```[]```").unwrap(), Vec::new());

        let raw = r#"```json [{"wrong_sentence": "a", "corrected_sentence": "b"}] ```"#;
        let parsed = parse_corrections(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].error_type, UNKNOWN);
    }
}
