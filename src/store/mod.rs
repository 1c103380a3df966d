//! Storage abstraction for the contact collection.
//!
//! Handlers talk to a [`ContactStore`] trait object so the database handle is
//! passed in explicitly rather than reached through process-global state.
//! Two backends exist: MongoDB for production and an in-memory map for tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::{Contact, ContactInput};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Storage-layer failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique email constraint rejected a write.
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Operations the contact service needs from its storage layer.
///
/// `input` values are validated by the caller before they reach the store.
/// Ids are hex ObjectId strings; an id that cannot name any document behaves
/// as absent rather than as an error.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a new contact, assigning its id and creation timestamp.
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError>;

    /// All contacts, newest first.
    async fn list(&self) -> Result<Vec<Contact>, StoreError>;

    /// Case-insensitive substring match on name or email, newest first.
    /// The query text is matched literally.
    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError>;

    /// Contact holding exactly this email, if any.
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError>;

    /// Whether a contact other than `excluding_id` holds this email.
    async fn email_taken_by_other(
        &self,
        email: &str,
        excluding_id: &str,
    ) -> Result<bool, StoreError>;

    /// Full-replace the named contact's fields, returning the updated record,
    /// or `None` when the id names nothing.
    async fn replace(&self, id: &str, input: ContactInput) -> Result<Option<Contact>, StoreError>;

    /// Remove the named contact. `false` when the id names nothing.
    async fn remove(&self, id: &str) -> Result<bool, StoreError>;
}

/// Which backend to build at startup.
#[derive(Clone, Debug)]
pub enum StoreConfig {
    Mongo { uri: String, database: String },
    InMemory,
}

impl StoreConfig {
    pub fn mongo<U: Into<String>, D: Into<String>>(uri: U, database: D) -> Self {
        StoreConfig::Mongo {
            uri: uri.into(),
            database: database.into(),
        }
    }

    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub async fn build(&self) -> Result<Arc<dyn ContactStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StoreConfig::Mongo { uri, database } => {
                Ok(Arc::new(MongoStore::connect(uri, database).await?))
            }
        }
    }
}
