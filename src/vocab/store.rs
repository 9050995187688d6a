use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::vocab::VocabEntry;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vocab_entries (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        word            TEXT NOT NULL CHECK (length(trim(word)) > 0),
        definition      TEXT NOT NULL,
        examples_json   TEXT NOT NULL,
        source_sentence TEXT NOT NULL DEFAULT '',
        created_at      INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_vocab_entries_created ON vocab_entries(created_at);";

const SELECT_ENTRIES: &str = "
    SELECT id, word, definition, examples_json, source_sentence, created_at
    FROM vocab_entries
    ORDER BY created_at DESC, id DESC";

/// SQLite-backed vocab bank. Owns the one logical table of saved words.
pub struct VocabStore {
    conn: Connection,
}

impl VocabStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Vocab store opened at {:?}", path);
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn create(
        &self,
        word: &str,
        definition: &str,
        examples: &[String],
        source_sentence: &str,
    ) -> Result<VocabEntry, StorageError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(StorageError::EmptyWord);
        }

        let created_at = Utc::now();
        let examples_json = serde_json::to_string(examples).map_err(|e| StorageError::Corrupt {
            id: 0,
            reason: format!("examples could not be encoded: {}", e),
        })?;

        self.conn.execute(
            "INSERT INTO vocab_entries (word, definition, examples_json, source_sentence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                word,
                definition,
                examples_json,
                source_sentence,
                created_at.timestamp_millis(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        let entry = VocabEntry {
            id,
            word: word.to_string(),
            definition: definition.to_string(),
            examples: examples.to_vec(),
            source_sentence: source_sentence.to_string(),
            // Round-trip through millis so the returned entry equals what list_all reads back
            created_at: from_millis(id, created_at.timestamp_millis())?,
        };

        info!("Saved '{}' to the vocab bank (id {})", entry.word, entry.id);
        Ok(entry)
    }

    /// All entries, most recent first.
    pub fn list_all(&self) -> Result<Vec<VocabEntry>, StorageError> {
        let mut stmt = self.conn.prepare(SELECT_ENTRIES)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    word: row.get(1)?,
                    definition: row.get(2)?,
                    examples_json: row.get(3)?,
                    source_sentence: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::into_entry).collect()
    }

    /// Entries whose word or definition contains `query`, ignoring case.
    /// A blank query returns everything.
    pub fn search(&self, query: &str) -> Result<Vec<VocabEntry>, StorageError> {
        let query = query.trim();
        let entries = self.list_all()?;

        if query.is_empty() {
            return Ok(entries);
        }

        // Filtered here rather than with LIKE, which only folds ASCII case
        let matches: Vec<VocabEntry> = entries.into_iter().filter(|e| e.matches(query)).collect();
        debug!("Search '{}' matched {} entries", query, matches.len());
        Ok(matches)
    }

    /// Most recent entry saved under `word`, compared case-insensitively.
    pub fn find_by_word(&self, word: &str) -> Result<Option<VocabEntry>, StorageError> {
        let word = word.trim().to_lowercase();
        Ok(self
            .list_all()?
            .into_iter()
            .find(|e| e.word.to_lowercase() == word))
    }

    /// Returns whether an entry was actually removed.
    pub fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM vocab_entries WHERE id = ?1", params![id])?;

        if removed > 0 {
            info!("Deleted vocab entry {}", id);
        } else {
            debug!("No vocab entry with id {} to delete", id);
        }

        Ok(removed > 0)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocab_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

struct StoredRow {
    id: i64,
    word: String,
    definition: String,
    examples_json: String,
    source_sentence: String,
    created_at: i64,
}

impl StoredRow {
    fn into_entry(self) -> Result<VocabEntry, StorageError> {
        let examples: Vec<String> =
            serde_json::from_str(&self.examples_json).map_err(|e| StorageError::Corrupt {
                id: self.id,
                reason: format!("examples are not a JSON string list: {}", e),
            })?;

        Ok(VocabEntry {
            id: self.id,
            created_at: from_millis(self.id, self.created_at)?,
            word: self.word,
            definition: self.definition,
            examples,
            source_sentence: self.source_sentence,
        })
    }
}

fn from_millis(id: i64, millis: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StorageError::Corrupt {
        id,
        reason: format!("timestamp {} is out of range", millis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn examples(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_then_list_round_trip() {
        let store = VocabStore::open_in_memory().unwrap();
        let ex = examples(&["Sign the lease.", "The lease ends in May."]);

        let created = store
            .create("Lease", "A rental contract.", &ex, "Your lease expires soon.")
            .unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(all[0].word, "Lease");
        assert_eq!(all[0].definition, "A rental contract.");
        assert_eq!(all[0].examples, ex);
        assert_eq!(all[0].source_sentence, "Your lease expires soon.");
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let store = VocabStore::open_in_memory().unwrap();
        let first = store.create("queue", "a line", &[], "").unwrap();
        let second = store.create("brolly", "an umbrella", &[], "").unwrap();
        let third = store.create("knackered", "very tired", &[], "").unwrap();

        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_ids_are_unique_and_never_reused() {
        let store = VocabStore::open_in_memory().unwrap();
        let a = store.create("a", "", &[], "").unwrap();
        let b = store.create("b", "", &[], "").unwrap();
        assert_ne!(a.id, b.id);

        assert!(store.delete(b.id).unwrap());
        let c = store.create("c", "", &[], "").unwrap();
        assert!(c.id > b.id);
    }

    #[test]
    fn test_empty_word_is_rejected() {
        let store = VocabStore::open_in_memory().unwrap();
        let result = store.create("  ", "nothing", &[], "");

        assert!(matches!(result, Err(StorageError::EmptyWord)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_word_case_is_preserved() {
        let store = VocabStore::open_in_memory().unwrap();
        let entry = store.create(" NHS ", "National Health Service", &[], "").unwrap();
        assert_eq!(entry.word, "NHS");
    }

    #[test]
    fn test_delete_missing_id_is_a_no_op() {
        let store = VocabStore::open_in_memory().unwrap();
        store.create("premises", "a building", &[], "").unwrap();
        let before = store.list_all().unwrap();

        assert!(!store.delete(9999).unwrap());
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_delete_twice() {
        let store = VocabStore::open_in_memory().unwrap();
        let keep = store.create("keep", "", &[], "").unwrap();
        let gone = store.create("gone", "", &[], "").unwrap();

        assert!(store.delete(gone.id).unwrap());
        let after_first = store.list_all().unwrap();
        assert_eq!(after_first, vec![keep]);

        assert!(!store.delete(gone.id).unwrap());
        assert_eq!(store.list_all().unwrap(), after_first);
    }

    #[test]
    fn test_empty_search_equals_list_all() {
        let store = VocabStore::open_in_memory().unwrap();
        store.create("lease", "rental contract", &[], "").unwrap();
        store.create("quid", "one pound", &[], "").unwrap();

        assert_eq!(store.search("").unwrap(), store.list_all().unwrap());
        assert_eq!(store.search("   ").unwrap(), store.list_all().unwrap());
    }

    #[test]
    fn test_search_is_case_insensitive_over_word_and_definition() {
        let store = VocabStore::open_in_memory().unwrap();
        let lease = store.create("Lease", "A rental contract.", &[], "").unwrap();
        let quid = store.create("quid", "Slang for one POUND.", &[], "").unwrap();

        assert_eq!(store.search("lease").unwrap(), vec![lease.clone()]);
        assert_eq!(store.search("pound").unwrap(), vec![quid]);
        assert_eq!(store.search("RENTAL").unwrap(), vec![lease]);
        assert!(store.search("tube").unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = VocabStore::open_in_memory().unwrap();
        store.create("fifty", "50%", &[], "").unwrap();
        store.create("under_score", "", &[], "").unwrap();

        assert_eq!(store.search("%").unwrap().len(), 1);
        assert_eq!(store.search("_").unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_word_and_count() {
        let store = VocabStore::open_in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.find_by_word("lease").unwrap().is_none());

        let lease = store.create("Lease", "", &[], "").unwrap();
        store.create("Leasehold", "", &[], "").unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.find_by_word("LEASE").unwrap(), Some(lease));
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vocab.db");

        let saved = {
            let store = VocabStore::open(&path).unwrap();
            let ex = examples(&["No smoking on the premises."]);
            store
                .create("premises", "a building and its land", &ex, "")
                .unwrap()
        };

        let reopened = VocabStore::open(&path).unwrap();
        assert_eq!(reopened.list_all().unwrap(), vec![saved]);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = VocabStore::open(file.path().join("vocab.db"));
        assert!(matches!(result, Err(StorageError::Directory(_))));
    }
}
