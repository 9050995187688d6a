pub const DEFINE_PREAMBLE: &str = "You are a friendly English tutor helping a non-native English speaker living in London. \
Explain words clearly and give examples rooted in everyday London/UK life (transport, work, weather, food, bureaucracy). \
Keep explanations concise but warm.";

const DEFINE_PROMPT: &str = "Explain the word {word} to me.

Respond with a single JSON object and nothing else. The object must have exactly these keys:
*   `\"definition\"`: a 1-2 sentence definition in plain English (string).
*   `\"examples\"`: 2 or 3 example sentences that use the word in everyday UK/London situations (array of strings).
*   `\"source_sentence\"`: the sentence from the source text below that contains the word, copied **verbatim** without rephrasing. Use an empty string if the word does not appear in the source text.

Example output:
```json
{
  \"definition\": \"A formal agreement that lets you rent a flat or house for a fixed period.\",
  \"examples\": [\"We signed a twelve-month lease on a flat in Hackney.\", \"The landlord wants to renew the lease in September.\"],
  \"source_sentence\": \"Your lease ends on 31 March.\"
}
```

Source text where the word was found:
\"\"\"
{context}
\"\"\"";

pub const REFRESH_PREAMBLE: &str = "You are a helpful English tutor specialising in UK/London contexts. \
Generate practical, relatable example sentences that differ from textbook examples.";

const REFRESH_PROMPT: &str = "The word is {word} and its definition is: {definition}

It came from this text, so keep the examples in a similar register:
\"\"\"
{context}
\"\"\"

Generate 3 NEW and DIFFERENT example sentences using this word. Draw on real London life: taking the Tube or bus, \
British weather, workplace scenarios, shopping at local markets, NHS appointments, council letters.

Do not reuse any of these earlier examples:
{previous}

Respond with a single JSON object and nothing else, in the form:
```json
{\"examples\": [\"...\", \"...\", \"...\"]}
```";

/// Prompt for a fresh lookup of `word` found in `context`.
pub fn define_prompt(word: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        "(no source text provided)"
    } else {
        context.trim()
    };

    let word = quoted(word);
    fill(DEFINE_PROMPT, &[("word", word.as_str()), ("context", context)])
}

/// Longest slice of the source text repeated in a refresh prompt
const REFRESH_CONTEXT_CHARS: usize = 500;

/// Prompt asking for replacement examples, listing the ones to avoid.
pub fn refresh_prompt(word: &str, definition: &str, context: &str, previous: &[String]) -> String {
    let context: String = match context.trim() {
        "" => "(no source text provided)".to_string(),
        text => text.chars().take(REFRESH_CONTEXT_CHARS).collect(),
    };

    let previous = if previous.is_empty() {
        "(none)".to_string()
    } else {
        previous
            .iter()
            .map(|example| format!("- {}", example))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let word = quoted(word);
    fill(
        REFRESH_PROMPT,
        &[
            ("word", word.as_str()),
            ("definition", definition),
            ("context", context.as_str()),
            ("previous", previous.as_str()),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template, so text
/// inserted for one placeholder is never scanned for another.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

// JSON string quoting keeps stray quotes in the word from breaking the prompt
fn quoted(word: &str) -> String {
    serde_json::to_string(word).unwrap_or_else(|_| format!("\"{}\"", word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_prompt_carries_word_and_context() {
        let prompt = define_prompt("premises", "Please vacate the premises.");

        assert!(prompt.contains("Explain the word \"premises\""));
        assert!(prompt.contains("\"\"\"\nPlease vacate the premises.\n\"\"\""));
        assert!(prompt.contains("\"source_sentence\""));
    }

    #[test]
    fn test_define_prompt_without_context() {
        let prompt = define_prompt("queue", "   ");
        assert!(prompt.contains("(no source text provided)"));
    }

    #[test]
    fn test_refresh_prompt_lists_previous_examples() {
        let previous = vec![
            "The premises were inspected.".to_string(),
            "No smoking on the premises.".to_string(),
        ];
        let prompt = refresh_prompt(
            "premises",
            "a building and its land",
            "Please vacate the premises.",
            &previous,
        );

        assert!(prompt.contains("The word is \"premises\""));
        assert!(prompt.contains("definition is: a building and its land"));
        assert!(prompt.contains("- The premises were inspected.\n- No smoking on the premises."));
        assert!(prompt.contains("\"\"\"\nPlease vacate the premises.\n\"\"\""));
        assert!(!prompt.contains("{previous}"));
    }

    #[test]
    fn test_refresh_prompt_truncates_long_context() {
        let context = "word ".repeat(400);
        let prompt = refresh_prompt("word", "a unit of language", &context, &[]);

        assert!(prompt.contains("(none)"));
        assert!(prompt.len() < context.len());
    }

    #[test]
    fn test_placeholders_in_values_are_left_alone() {
        let prompt = refresh_prompt(
            "template",
            "a pattern with slots like {context} or {previous}",
            "Fill in the {word} template.",
            &["Use the {definition} template.".to_string()],
        );

        assert!(prompt.contains("definition is: a pattern with slots like {context} or {previous}"));
        assert!(prompt.contains("\"\"\"\nFill in the {word} template.\n\"\"\""));
        assert!(prompt.contains("- Use the {definition} template."));
        assert_eq!(prompt.matches("Fill in the").count(), 1);
    }

    #[test]
    fn test_json_braces_in_template_survive() {
        let prompt = refresh_prompt("lease", "a contract", "Sign the lease.", &[]);
        assert!(prompt.contains("{\"examples\": [\"...\", \"...\", \"...\"]}"));

        let prompt = define_prompt("lease", "Sign the lease.");
        assert!(prompt.contains("{\n  \"definition\""));
    }

    #[test]
    fn test_word_with_quotes_is_escaped() {
        let prompt = define_prompt("\"quid\"", "");
        assert!(prompt.contains("Explain the word \"\\\"quid\\\"\""));
    }
}
