//! System prompt for the grammar-checking model.

use std::sync::OnceLock;

use super::ErrorType;

/// The system prompt, built once from the [`ErrorType`] list.
pub fn system_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(build)
}

fn build() -> String {
    let error_types = ErrorType::ALL
        .iter()
        .map(|t| format!("    \"{}\"", t.label()))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are an advanced grammar-checking assistant.
Your job is to identify grammatical errors in the provided text, classify the type of error, and provide corrections.

## Output format:
Return your response as a JSON array, where each element is an object containing the following keys:
- 'wrong_sentence': The grammatically incorrect sentence.
- 'corrected_sentence': The corrected version of the sentence.
- 'error_type': The type of grammatical error, chosen from the predefined list below.
If the text contains no errors, return an empty JSON array: []

## Error types:
"error_type": [
{error_types}
]

## Guidelines:
- Ensure your corrections maintain the original meaning of the sentence.
- If a sentence has multiple errors, split them into separate entries in the JSON array.
- Avoid making stylistic changes unless they directly impact grammar.
- Return only the JSON array, with no surrounding prose.

## Examples:

input_text = "I has a pen."
your response:
[
  {{
    "wrong_sentence": "I has a pen.",
    "corrected_sentence": "I have a pen.",
    "error_type": "Subject-verb agreement"
  }}
]

input_text = "He buyed a new book."
your response:
[
  {{
    "wrong_sentence": "He buyed a new book.",
    "corrected_sentence": "He bought a new book.",
    "error_type": "Verb tense"
  }}
]
"#
    )
}
