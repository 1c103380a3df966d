//! In-memory store used by tests and local development.
//!
//! Mirrors the MongoDB backend's observable semantics: unique emails,
//! ObjectId-shaped ids, newest-first ordering.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::{ContactStore, StoreError};
use crate::model::{Contact, ContactInput};

struct Entry {
    /// Insertion sequence, tie-break for identical timestamps.
    seq: u64,
    contact: Contact,
}

pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    fn collect_sorted<F>(&self, mut keep: F) -> Result<Vec<Contact>, StoreError>
    where
        F: FnMut(&Contact) -> bool,
    {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        let mut matches: Vec<(u64, Contact)> = guard
            .values()
            .filter(|e| keep(&e.contact))
            .map(|e| (e.seq, e.contact.clone()))
            .collect();
        matches.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(matches.into_iter().map(|(_, c)| c).collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        if guard.values().any(|e| e.contact.email == input.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let contact = Contact {
            id: ObjectId::new().to_hex(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: Utc::now(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        guard.insert(
            contact.id.clone(),
            Entry {
                seq,
                contact: contact.clone(),
            },
        );
        Ok(contact)
    }

    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        self.collect_sorted(|_| true)
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError> {
        let needle = query.to_lowercase();
        self.collect_sorted(|c| {
            c.name.to_lowercase().contains(&needle) || c.email.to_lowercase().contains(&needle)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        Ok(guard
            .values()
            .find(|e| e.contact.email == email)
            .map(|e| e.contact.clone()))
    }

    async fn email_taken_by_other(
        &self,
        email: &str,
        excluding_id: &str,
    ) -> Result<bool, StoreError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        Ok(guard
            .values()
            .any(|e| e.contact.email == email && e.contact.id != excluding_id))
    }

    async fn replace(&self, id: &str, input: ContactInput) -> Result<Option<Contact>, StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        if guard
            .values()
            .any(|e| e.contact.email == input.email && e.contact.id != id)
        {
            return Err(StoreError::DuplicateEmail);
        }
        match guard.get_mut(id) {
            Some(entry) => {
                entry.contact.name = input.name;
                entry.contact.email = input.email;
                entry.contact.phone = input.phone;
                Ok(Some(entry.contact.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        Ok(guard.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, phone: &str) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = InMemoryStore::new();
        let contact = store.insert(input("Ann", "ann@x.com", "111")).await.unwrap();
        assert_eq!(contact.id.len(), 24);
        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.email, "ann@x.com");
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryStore::new();
        store.insert(input("Ann", "ann@x.com", "111")).await.unwrap();
        let err = store.insert(input("Bob", "ann@x.com", "222")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryStore::new();
        store.insert(input("Ann", "ann@x.com", "111")).await.unwrap();
        store.insert(input("Bob", "bob@x.com", "222")).await.unwrap();
        store.insert(input("Cid", "cid@x.com", "333")).await.unwrap();
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Cid", "Bob", "Ann"]);
    }

    #[tokio::test]
    async fn search_matches_name_or_email_case_insensitively() {
        let store = InMemoryStore::new();
        store.insert(input("Ann Smith", "ann@x.com", "111")).await.unwrap();
        store.insert(input("Bob", "bob@SMITHY.org", "222")).await.unwrap();
        store.insert(input("Cid", "cid@x.com", "333")).await.unwrap();

        let hits = store.search("smith").await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = store.search("ANN@X").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ann Smith");
    }

    #[tokio::test]
    async fn replace_keeps_own_email_and_rejects_foreign() {
        let store = InMemoryStore::new();
        let ann = store.insert(input("Ann", "ann@x.com", "111")).await.unwrap();
        let bob = store.insert(input("Bob", "bob@x.com", "222")).await.unwrap();

        let updated = store
            .replace(&ann.id, input("Ann", "ann@x.com", "999"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.phone, "999");

        let err = store
            .replace(&bob.id, input("Bob", "ann@x.com", "222"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn replace_and_remove_unknown_id() {
        let store = InMemoryStore::new();
        let missing = ObjectId::new().to_hex();
        assert!(store
            .replace(&missing, input("X", "x@x.com", "1"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.remove(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn email_taken_by_other_ignores_self() {
        let store = InMemoryStore::new();
        let ann = store.insert(input("Ann", "ann@x.com", "111")).await.unwrap();
        assert!(!store.email_taken_by_other("ann@x.com", &ann.id).await.unwrap());
        assert!(store.email_taken_by_other("ann@x.com", "ffffffffffffffffffffffff").await.unwrap());
    }
}
