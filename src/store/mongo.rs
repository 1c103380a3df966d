//! MongoDB-backed contact store.
//!
//! One `contacts` collection. A unique index on `email` is created at
//! startup; it is the real uniqueness guarantee, with the handlers'
//! pre-write existence check serving as an early reject.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::{ContactStore, StoreError};
use crate::model::{Contact, ContactInput};

const COLLECTION: &str = "contacts";

/// Persisted document form: native ObjectId and BSON datetime.
#[derive(Debug, Serialize, Deserialize)]
struct ContactDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    phone: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
}

impl From<ContactDocument> for Contact {
    fn from(doc: ContactDocument) -> Self {
        Contact {
            id: doc.id.to_hex(),
            name: doc.name,
            email: doc.email,
            phone: doc.phone,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

pub struct MongoStore {
    contacts: Collection<ContactDocument>,
}

impl MongoStore {
    /// Connect, ping, and ensure the unique email index.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(StoreError::backend)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(StoreError::backend)?;

        let contacts = db.collection::<ContactDocument>(COLLECTION);
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        contacts
            .create_index(email_index, None)
            .await
            .map_err(StoreError::backend)?;

        tracing::info!(database, "MongoDB connected");
        Ok(Self { contacts })
    }

    async fn find_sorted(
        &self,
        filter: impl Into<Option<mongodb::bson::Document>>,
    ) -> Result<Vec<Contact>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self
            .contacts
            .find(filter, options)
            .await
            .map_err(StoreError::backend)?;
        let docs: Vec<ContactDocument> = cursor.try_collect().await.map_err(StoreError::backend)?;
        Ok(docs.into_iter().map(Contact::from).collect())
    }
}

/// E11000 from the unique index, surfaced either as a write error or as a
/// command error depending on the operation.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        ErrorKind::Command(command_err) => command_err.code == 11000,
        _ => false,
    }
}

fn write_error(err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::DuplicateEmail
    } else {
        StoreError::backend(err)
    }
}

#[async_trait]
impl ContactStore for MongoStore {
    async fn insert(&self, input: ContactInput) -> Result<Contact, StoreError> {
        let document = ContactDocument {
            id: ObjectId::new(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: DateTime::now(),
        };
        self.contacts
            .insert_one(&document, None)
            .await
            .map_err(write_error)?;
        Ok(document.into())
    }

    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        self.find_sorted(doc! {}).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, StoreError> {
        // Substring semantics: the user's text is escaped, never interpreted
        // as a pattern.
        let pattern = regex::escape(query);
        let filter = doc! {
            "$or": [
                { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                { "email": { "$regex": pattern.as_str(), "$options": "i" } },
            ]
        };
        self.find_sorted(filter).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        let found = self
            .contacts
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(found.map(Contact::from))
    }

    async fn email_taken_by_other(
        &self,
        email: &str,
        excluding_id: &str,
    ) -> Result<bool, StoreError> {
        // An id that parses excludes its own document; one that doesn't can
        // name nothing, so any holder of the email counts.
        let filter = match ObjectId::parse_str(excluding_id) {
            Ok(oid) => doc! { "email": email, "_id": { "$ne": oid } },
            Err(_) => doc! { "email": email },
        };
        let found = self
            .contacts
            .find_one(filter, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(found.is_some())
    }

    async fn replace(&self, id: &str, input: ContactInput) -> Result<Option<Contact>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let update = doc! {
            "$set": {
                "name": input.name.as_str(),
                "email": input.email.as_str(),
                "phone": input.phone.as_str(),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .contacts
            .find_one_and_update(doc! { "_id": oid }, update, options)
            .await
            .map_err(write_error)?;
        Ok(updated.map(Contact::from))
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let deleted = self
            .contacts
            .find_one_and_delete(doc! { "_id": oid }, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn document_uses_mongo_field_names() {
        let document = ContactDocument {
            id: ObjectId::new(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: "111".into(),
            created_at: DateTime::now(),
        };
        let raw = bson::to_document(&document).unwrap();
        assert!(raw.contains_key("_id"));
        assert!(raw.contains_key("createdAt"));
        assert!(!raw.contains_key("created_at"));
    }

    #[test]
    fn document_converts_to_wire_contact() {
        let oid = ObjectId::new();
        let document = ContactDocument {
            id: oid,
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: "111".into(),
            created_at: DateTime::now(),
        };
        let contact = Contact::from(document);
        assert_eq!(contact.id, oid.to_hex());
        assert_eq!(contact.email, "ann@x.com");
    }
}
