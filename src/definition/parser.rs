use serde::Deserialize;
use tracing::debug;

use crate::definition::DefinitionResult;
use crate::error::ProviderError;

/// Upper bound on examples kept from a single reply
pub const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Deserialize)]
struct RawDefinition {
    definition: Option<String>,
    examples: Option<Vec<String>>,
    source_sentence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExamples {
    examples: Option<Vec<String>>,
}

/// Parses a reply to the define prompt. `source_sentence` is returned as the
/// model gave it; checking it against the source text is the caller's job.
pub fn parse_definition(reply: &str) -> Result<DefinitionResult, ProviderError> {
    let raw: RawDefinition = parse_object(reply)?;

    let definition = raw
        .definition
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| malformed("missing or empty \"definition\"", reply))?;

    let examples = clean_examples(raw.examples, reply)?;

    let source_sentence = raw
        .source_sentence
        .ok_or_else(|| malformed("missing \"source_sentence\"", reply))?
        .trim()
        .to_string();

    Ok(DefinitionResult {
        definition,
        examples,
        source_sentence,
    })
}

/// Parses a reply to the refresh prompt.
pub fn parse_examples(reply: &str) -> Result<Vec<String>, ProviderError> {
    let raw: RawExamples = parse_object(reply)?;
    clean_examples(raw.examples, reply)
}

fn parse_object<T: for<'de> Deserialize<'de>>(reply: &str) -> Result<T, ProviderError> {
    let reply = reply.trim();

    // The model may wrap the object in a code fence or a line of prose
    let start = reply
        .find('{')
        .ok_or_else(|| malformed("no JSON object in reply", reply))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| malformed("unterminated JSON object", reply))?;

    let json_text = &reply[start..=end];
    debug!("Parsing provider JSON: {}", json_text);

    serde_json::from_str(json_text).map_err(|e| malformed(&format!("invalid JSON: {}", e), reply))
}

fn clean_examples(examples: Option<Vec<String>>, reply: &str) -> Result<Vec<String>, ProviderError> {
    let examples: Vec<String> = examples
        .ok_or_else(|| malformed("missing \"examples\"", reply))?
        .into_iter()
        .map(|example| example.trim().to_string())
        .filter(|example| !example.is_empty())
        .take(MAX_EXAMPLES)
        .collect();

    if examples.is_empty() {
        return Err(malformed("no example sentences", reply));
    }

    Ok(examples)
}

fn malformed(reason: &str, reply: &str) -> ProviderError {
    let preview: String = reply.chars().take(200).collect();
    ProviderError::MalformedResponse(format!("{}, response was: {}", reason, preview))
}
