//! Persistence collaborator used when factories create records

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use thiserror::Error;

use crate::error::{FactoryError, FactoryResult};
use crate::record::{RecordId, SynthesizedRecord};

/// Stores a synthesized record and hands back its identifier.
///
/// Factories know nothing about how storage works; anything that can insert
/// a row (a database pool wrapper, an in-memory table, a recording mock)
/// implements this trait. Errors are surfaced to the caller unchanged.
///
/// A synthesis that fails part way rolls the store back to the
/// [`Savepoint`] taken before it started, so related records created for it
/// do not outlive the error.
pub trait RecordStore {
    fn insert(&mut self, kind: &str, record: &SynthesizedRecord) -> FactoryResult<RecordId>;

    /// Mark the current position in the insert history
    fn savepoint(&self) -> Savepoint;

    /// Remove every record inserted after `savepoint`
    fn rollback_to(&mut self, savepoint: Savepoint) -> FactoryResult<()>;
}

/// Number of inserts a store had seen when the savepoint was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Savepoint(pub usize);

/// Sequence generator for unique values
#[derive(Debug)]
pub struct Sequence {
    current: AtomicU64,
}

impl Sequence {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
        }
    }

    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst)
    }

    pub fn next_string(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by [`InMemoryStore`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unique constraint violated on {kind}.{field} for value {value}")]
    UniqueViolation {
        kind: String,
        field: String,
        value: String,
    },
}

/// In-memory table per entity kind with auto-incrementing ids starting at 1
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: HashMap<String, Vec<SynthesizedRecord>>,
    sequences: HashMap<String, Sequence>,
    unique: HashMap<String, Vec<String>>,
    seen: HashMap<(String, String), HashSet<String>>,
    history: Vec<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts of `kind` whose `field` repeats an earlier value
    pub fn with_unique_constraint(mut self, kind: &str, field: &str) -> Self {
        self.unique
            .entry(kind.to_string())
            .or_default()
            .push(field.to_string());
        self
    }

    pub fn records(&self, kind: &str) -> &[SynthesizedRecord] {
        self.tables.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: &str) -> usize {
        self.records(kind).len()
    }

    pub fn total(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn find(&self, kind: &str, id: RecordId) -> Option<&SynthesizedRecord> {
        self.records(kind).iter().find(|r| r.id() == Some(id))
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.sequences.clear();
        self.seen.clear();
        self.history.clear();
    }

    fn check_unique(&self, kind: &str, record: &SynthesizedRecord) -> Result<(), StoreError> {
        let Some(fields) = self.unique.get(kind) else {
            return Ok(());
        };

        for field in fields {
            let value = unique_key(record.get(field));
            let key = (kind.to_string(), field.clone());
            if self.seen.get(&key).is_some_and(|values| values.contains(&value)) {
                return Err(StoreError::UniqueViolation {
                    kind: kind.to_string(),
                    field: field.clone(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl RecordStore for InMemoryStore {
    fn insert(&mut self, kind: &str, record: &SynthesizedRecord) -> FactoryResult<RecordId> {
        self.check_unique(kind, record)
            .map_err(|e| FactoryError::persistence(kind, e))?;

        if let Some(fields) = self.unique.get(kind) {
            for field in fields {
                self.seen
                    .entry((kind.to_string(), field.clone()))
                    .or_default()
                    .insert(unique_key(record.get(field)));
            }
        }

        let id = self
            .sequences
            .entry(kind.to_string())
            .or_insert_with(|| Sequence::starting_at(1))
            .next();

        let mut fields = record.fields().clone();
        fields.insert("id".to_string(), Value::from(id));
        self.tables
            .entry(kind.to_string())
            .or_default()
            .push(SynthesizedRecord::new(kind, fields));
        self.history.push(kind.to_string());

        tracing::trace!(kind, id, "stored record in memory");
        Ok(id)
    }

    fn savepoint(&self) -> Savepoint {
        Savepoint(self.history.len())
    }

    fn rollback_to(&mut self, savepoint: Savepoint) -> FactoryResult<()> {
        while self.history.len() > savepoint.0 {
            let Some(kind) = self.history.pop() else {
                break;
            };
            let Some(record) = self.tables.get_mut(&kind).and_then(Vec::pop) else {
                continue;
            };

            if let Some(fields) = self.unique.get(&kind) {
                for field in fields {
                    if let Some(values) = self.seen.get_mut(&(kind.clone(), field.clone())) {
                        values.remove(&unique_key(record.get(field)));
                    }
                }
            }
            if let Some(id) = record.id() {
                self.sequences.insert(kind.clone(), Sequence::starting_at(id));
            }
            tracing::trace!(kind = %kind, id = ?record.id(), "rolled back record");
        }
        Ok(())
    }
}

fn unique_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record(kind: &str, email: &str) -> SynthesizedRecord {
        let mut fields = Map::new();
        fields.insert("email".to_string(), json!(email));
        SynthesizedRecord::new(kind, fields)
    }

    #[test]
    fn test_sequence() {
        let seq = Sequence::new();

        assert_eq!(seq.next(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next_string("user"), "user2");
    }

    #[test]
    fn test_ids_are_per_kind() {
        let mut store = InMemoryStore::new();

        assert_eq!(store.insert("User", &record("User", "a@example.com")).unwrap(), 1);
        assert_eq!(store.insert("User", &record("User", "b@example.com")).unwrap(), 2);
        assert_eq!(store.insert("Post", &record("Post", "x")).unwrap(), 1);

        assert_eq!(store.count("User"), 2);
        assert_eq!(store.total(), 3);
        assert_eq!(
            store.find("User", 2).and_then(|r| r.get("email")),
            Some(&json!("b@example.com"))
        );
        assert!(store.find("User", 3).is_none());
    }

    #[test]
    fn test_unique_constraint_violation_is_surfaced() {
        let mut store = InMemoryStore::new().with_unique_constraint("User", "email");

        store.insert("User", &record("User", "dup@example.com")).unwrap();
        let err = store
            .insert("User", &record("User", "dup@example.com"))
            .unwrap_err();

        match err {
            FactoryError::Persistence { kind, source } => {
                assert_eq!(kind, "User");
                assert!(source.to_string().contains("User.email"));
            }
            other => panic!("expected persistence error, got {other:?}"),
        }
        assert_eq!(store.count("User"), 1);
    }

    #[test]
    fn test_rollback_restores_ids_and_unique_values() {
        let mut store = InMemoryStore::new().with_unique_constraint("User", "email");
        store.insert("User", &record("User", "a@example.com")).unwrap();

        let savepoint = store.savepoint();
        store.insert("User", &record("User", "b@example.com")).unwrap();
        store.insert("Post", &record("Post", "x")).unwrap();
        store.rollback_to(savepoint).unwrap();

        assert_eq!(store.total(), 1);
        assert_eq!(store.savepoint(), savepoint);
        assert_eq!(store.insert("User", &record("User", "b@example.com")).unwrap(), 2);
        assert_eq!(store.insert("Post", &record("Post", "y")).unwrap(), 1);
    }

    #[test]
    fn test_clear_resets_sequences() {
        let mut store = InMemoryStore::new();
        store.insert("User", &record("User", "a@example.com")).unwrap();
        store.clear();

        assert_eq!(store.total(), 0);
        assert_eq!(store.insert("User", &record("User", "a@example.com")).unwrap(), 1);
    }
}
