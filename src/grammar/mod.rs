//! Grammar checking pipeline.
//!
//! - `prompt`: the system prompt sent with every request
//! - `parser`: turns raw model output into [`Correction`] records
//! - `retry`: bounded exponential backoff around the completion call
//! - `checker`: composes client, retry and parser into one call

mod checker;
mod error;
pub mod parser;
pub mod prompt;
pub mod retry;

pub use checker::GrammarChecker;
pub use error::CheckError;
pub use parser::{parse_corrections, ParseError};
pub use retry::{Outcome, RetryPolicy};

use serde::{Deserialize, Serialize};

/// Placeholder used when the model omits or mistypes a field.
pub const UNKNOWN: &str = "Unknown";

/// One detected grammatical error with its fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub wrong_sentence: String,
    pub corrected_sentence: String,
    /// Label as returned by the model (see [`ErrorType`]), or `"Unknown"`.
    pub error_type: String,
}

impl Correction {
    /// Category of this correction, if the label names a known error type.
    pub fn category(&self) -> Option<ErrorType> {
        ErrorType::from_label(&self.error_type)
    }
}

/// Error categories the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    VerbTense,
    SpellingMistake,
    PunctuationError,
    SubjectVerbAgreement,
    ArticleUsage,
    PrepositionUsage,
    WordChoice,
    OtherGrammaticalError,
}

impl ErrorType {
    pub const ALL: [ErrorType; 8] = [
        ErrorType::VerbTense,
        ErrorType::SpellingMistake,
        ErrorType::PunctuationError,
        ErrorType::SubjectVerbAgreement,
        ErrorType::ArticleUsage,
        ErrorType::PrepositionUsage,
        ErrorType::WordChoice,
        ErrorType::OtherGrammaticalError,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorType::VerbTense => "Verb tense",
            ErrorType::SpellingMistake => "Spelling mistake",
            ErrorType::PunctuationError => "Punctuation error",
            ErrorType::SubjectVerbAgreement => "Subject-verb agreement",
            ErrorType::ArticleUsage => "Article usage",
            ErrorType::PrepositionUsage => "Preposition usage",
            ErrorType::WordChoice => "Word choice",
            ErrorType::OtherGrammaticalError => "Other grammatical error",
        }
    }

    /// Case-insensitive lookup; models are inconsistent about capitalization.
    pub fn from_label(label: &str) -> Option<ErrorType> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_ignoring_case() {
        for t in ErrorType::ALL {
            assert_eq!(ErrorType::from_label(t.label()), Some(t));
        }
        assert_eq!(
            ErrorType::from_label("Subject-Verb Agreement"),
            Some(ErrorType::SubjectVerbAgreement)
        );
        assert_eq!(ErrorType::from_label(UNKNOWN), None);
    }

    #[test]
    fn correction_serializes_with_snake_case_keys() {
        let c = Correction {
            wrong_sentence: "I has a pen.".to_string(),
            corrected_sentence: "I have a pen.".to_string(),
            error_type: "Subject-verb agreement".to_string(),
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["wrong_sentence"], "I has a pen.");
        assert_eq!(v["corrected_sentence"], "I have a pen.");
        assert_eq!(v["error_type"], "Subject-verb agreement");
        assert_eq!(c.category(), Some(ErrorType::SubjectVerbAgreement));
    }
}
