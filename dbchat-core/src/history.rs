//! In-memory query history.
//!
//! An owned store of generated queries. Callers that share one across tasks
//! wrap it in a lock; nothing here is global.

use crate::Result;
use crate::error::DbChatError;
use crate::models::GeneratedQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One remembered prompt and the query generated for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Store-assigned id, starting at 1
    pub id: u64,
    /// When the entry was added
    pub timestamp: DateTime<Utc>,
    /// Natural-language request
    pub prompt: String,
    /// Generated SQL
    pub query: String,
    /// Model's explanation of the query
    pub summary: String,
}

/// Insertion-ordered history with monotonically increasing ids.
#[derive(Debug)]
pub struct HistoryStore {
    items: Vec<HistoryItem>,
    next_id: u64,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends an entry stamped with the current time.
    pub fn add(
        &mut self,
        prompt: impl Into<String>,
        query: impl Into<String>,
        summary: impl Into<String>,
    ) -> &HistoryItem {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(HistoryItem {
            id,
            timestamp: Utc::now(),
            prompt: prompt.into(),
            query: query.into(),
            summary: summary.into(),
        });
        tracing::debug!("Recorded history item {}", id);
        &self.items[self.items.len() - 1]
    }

    /// Records the output of query generation for a prompt.
    pub fn record(&mut self, prompt: impl Into<String>, generated: &GeneratedQuery) -> &HistoryItem {
        self.add(prompt, generated.query.clone(), generated.summary.clone())
    }

    /// All entries, oldest first.
    pub fn list(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Removes one entry.
    ///
    /// # Errors
    /// Returns `HistoryItemNotFound` if no entry has `id`
    pub fn delete(&mut self, id: u64) -> Result<HistoryItem> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(DbChatError::HistoryItemNotFound { id })?;
        Ok(self.items.remove(position))
    }

    /// Removes every entry. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut store = HistoryStore::new();
        assert_eq!(store.add("a", "SELECT 1", "one").id, 1);
        assert_eq!(store.add("b", "SELECT 2", "two").id, 2);
        let ids: Vec<u64> = store.list().iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn test_delete_and_missing_id() {
        let mut store = HistoryStore::new();
        store.add("a", "SELECT 1", "one");
        store.add("b", "SELECT 2", "two");

        let removed = store.delete(1).unwrap();
        assert_eq!(removed.prompt, "a");
        assert_eq!(store.len(), 1);
        assert!(store.get(1).is_none());

        assert!(matches!(
            store.delete(1),
            Err(DbChatError::HistoryItemNotFound { id: 1 })
        ));
    }

    #[test]
    fn test_clear_keeps_id_sequence() {
        let mut store = HistoryStore::new();
        store.add("a", "SELECT 1", "one");
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.add("b", "SELECT 2", "two").id, 2);
    }

    #[test]
    fn test_record_generated_query() {
        let mut store = HistoryStore::new();
        let generated = GeneratedQuery {
            summary: "Counts customers".to_string(),
            query: "SELECT COUNT(*) FROM customers".to_string(),
        };
        let item = store.record("how many customers?", &generated);
        assert_eq!(item.query, generated.query);
        assert_eq!(item.summary, generated.summary);
        assert_eq!(item.prompt, "how many customers?");
    }
}
