//! Plain-text formatting for the terminal UI

use chrono::Local;
use console::style;
use std::collections::HashSet;

use crate::definition::DefinitionResult;
use crate::vocab::VocabEntry;

/// Width of the definition column in the vocab bank list
pub const DEFINITION_PREVIEW_CHARS: usize = 80;

/// Removes the markdown the model sometimes puts in definitions.
pub fn strip_markdown(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.trim_start_matches('#').trim_start();
            let line = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line);
            line.replace("**", "").replace("__", "").replace('`', "")
        })
        .collect();

    lines
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Distinct words of `text` in order of first appearance, ignoring case.
pub fn candidate_words(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    text.split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '-'))
        .map(|token| token.trim_matches(|c| c == '\'' || c == '-'))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| seen.insert(token.to_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn format_result_card(word: &str, result: &DefinitionResult) -> String {
    let mut card = String::new();

    card.push_str(&format!("\n📝 {}\n\n", style(word).bold()));
    card.push_str(&format!("{}\n", style("Definition:").bold()));
    card.push_str(&format!("  {}\n", strip_markdown(&result.definition)));

    if !result.source_sentence.is_empty() {
        card.push_str(&format!("\n{}\n", style("From your text:").bold()));
        card.push_str(&format!(
            "  {}\n",
            style(format!("\"{}\"", result.source_sentence)).italic()
        ));
    }

    card.push_str(&format!("\n{}\n", style("Examples:").bold()));
    for (i, example) in result.examples.iter().enumerate() {
        card.push_str(&format!("  {}. {}\n", i + 1, example));
    }

    card
}

/// One line per entry for the vocab bank picker
pub fn format_entry_row(entry: &VocabEntry) -> String {
    format!(
        "{:<18} {:<width$}  {}",
        entry.word,
        truncate(&strip_markdown(&entry.definition), DEFINITION_PREVIEW_CHARS),
        format_date(entry),
        width = DEFINITION_PREVIEW_CHARS + 3
    )
}

pub fn format_entry_details(entry: &VocabEntry) -> String {
    let mut details = format!(
        "\n📝 {}  {}\n\n{} {}\n",
        style(&entry.word).bold(),
        style(format!("(added {})", format_date(entry))).dim(),
        style("Definition:").bold(),
        strip_markdown(&entry.definition)
    );

    if !entry.source_sentence.is_empty() {
        details.push_str(&format!(
            "{} {}\n",
            style("Original context:").bold(),
            strip_markdown(&entry.source_sentence)
        ));
    }

    if !entry.examples.is_empty() {
        details.push_str(&format!("{}\n", style("Examples:").bold()));
        for (i, example) in entry.examples.iter().enumerate() {
            details.push_str(&format!("  {}. {}\n", i + 1, example));
        }
    }

    details
}

fn format_date(entry: &VocabEntry) -> String {
    entry
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_strip_markdown() {
        assert_eq!(
            strip_markdown("**Premises** are the `building` and\n- its land"),
            "Premises are the building and its land"
        );
        assert_eq!(strip_markdown("## Lease\nA __contract__."), "Lease A contract.");
        assert_eq!(strip_markdown("under_score stays"), "under_score stays");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ab cdef", 3), "ab...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_candidate_words() {
        let words = candidate_words("Please vacate the premises. The tenant's lease—a 12-month one—ends.");
        assert_eq!(
            words,
            vec!["Please", "vacate", "the", "premises", "tenant's", "lease", "month", "one", "ends"]
        );
    }

    #[test]
    fn test_result_card_lists_examples_and_source() {
        let result = DefinitionResult {
            definition: "**the building** and land".to_string(),
            examples: vec!["The premises were inspected.".to_string()],
            source_sentence: "Please vacate the premises.".to_string(),
        };

        let card = console::strip_ansi_codes(&format_result_card("premises", &result)).to_string();
        assert!(card.contains("the building and land"));
        assert!(card.contains("\"Please vacate the premises.\""));
        assert!(card.contains("1. The premises were inspected."));
    }

    #[test]
    fn test_entry_row_truncates_definition() {
        let entry = VocabEntry {
            id: 7,
            word: "Lease".to_string(),
            definition: "word ".repeat(40),
            examples: vec![],
            source_sentence: String::new(),
            created_at: Utc::now(),
        };

        let row = format_entry_row(&entry);
        assert!(row.starts_with("Lease"));
        assert!(row.contains("..."));
        assert!(row.ends_with(&format_date(&entry)));
    }
}
