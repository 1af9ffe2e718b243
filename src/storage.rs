//!
//! podium storage module
//! ---------------------
//! In-memory store backing the account and leaderboard services. The store owns
//! exactly two collections: registered identities keyed by handle, and the
//! append-only list of submitted score records held in insertion order. Sort
//! order for leaderboard reads is computed at query time, never on write.
//!
//! The public API centers around the `Store` type, which is wrapped in a
//! thread-safe `SharedStore` (`Arc<Mutex<Store>>`) so each mutation is atomic
//! from the caller's perspective.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A registered account: the unique handle and the PHC-encoded password hash.
///
/// The hash never leaves the process; response payloads are built from the
/// handle alone.
#[derive(Debug, Clone)]
pub struct Identity {
    pub handle: String,
    pub password_hash: String,
}

/// A single immutable leaderboard entry.
///
/// `timestamp` is a caller-supplied ordering hint in epoch milliseconds; it is
/// stored opaque and never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub level: String,
    pub user_handle: String,
    pub score: f64,
    pub timestamp: i64,
}

/// Core in-memory storage for identities and score records.
#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, Identity>,
    scores: Vec<ScoreRecord>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identity by exact, case-sensitive handle.
    pub fn identity(&self, handle: &str) -> Option<&Identity> {
        self.users.get(handle)
    }

    pub fn contains_handle(&self, handle: &str) -> bool {
        self.users.contains_key(handle)
    }

    /// Insert a new identity. Returns false (leaving the store untouched) if
    /// the handle is already registered.
    pub fn insert_identity(&mut self, identity: Identity) -> bool {
        use std::collections::hash_map::Entry;
        match self.users.entry(identity.handle.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(identity);
                true
            }
        }
    }

    /// Append a score record. Records are immutable once stored; there is no
    /// update or delete path.
    pub fn push_score(&mut self, record: ScoreRecord) {
        self.scores.push(record);
    }

    /// All score records in insertion order.
    pub fn scores(&self) -> &[ScoreRecord] {
        &self.scores
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn score_count(&self) -> usize {
        self.scores.len()
    }
}

#[derive(Clone)]
pub struct SharedStore(pub Arc<Mutex<Store>>);

impl SharedStore {
    pub fn new() -> Self {
        SharedStore(Arc::new(Mutex::new(Store::new())))
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(handle: &str) -> Identity {
        Identity { handle: handle.to_string(), password_hash: "$argon2id$stub".to_string() }
    }

    #[test]
    fn insert_identity_rejects_duplicate_handle() {
        let mut store = Store::new();
        assert!(store.insert_identity(identity("player_one")));
        assert!(!store.insert_identity(identity("player_one")));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn handle_lookup_is_case_sensitive() {
        let mut store = Store::new();
        store.insert_identity(identity("PlayerOne"));
        assert!(store.identity("PlayerOne").is_some());
        assert!(store.identity("playerone").is_none());
    }

    #[test]
    fn scores_keep_insertion_order() {
        let mut store = Store::new();
        for (i, score) in [30.0, 10.0, 20.0].iter().enumerate() {
            store.push_score(ScoreRecord {
                level: "L1".to_string(),
                user_handle: format!("player_{i}"),
                score: *score,
                timestamp: i as i64,
            });
        }
        let stored: Vec<f64> = store.scores().iter().map(|r| r.score).collect();
        assert_eq!(stored, vec![30.0, 10.0, 20.0]);
    }
}
