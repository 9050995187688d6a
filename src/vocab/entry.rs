use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved word in the vocab bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub id: i64,
    pub word: String,
    pub definition: String,
    pub examples: Vec<String>,
    /// Sentence of the user's text the word was found in, empty if unknown
    pub source_sentence: String,
    pub created_at: DateTime<Utc>,
}

impl VocabEntry {
    /// Case-insensitive substring match on word or definition
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.word.to_lowercase().contains(&query)
            || self.definition.to_lowercase().contains(&query)
    }
}
