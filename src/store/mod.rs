//! Document store module
//!
//! [`DocumentStore`] is the seam between command dispatch and the database.
//! The server runs against [`MongoStore`]; tests plug in an in-memory fake.

#[cfg(test)]
pub mod fake;
mod mongo;

pub use mongo::MongoStore;

use async_trait::async_trait;
use bson::{doc, Document};

/// Store operation failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// Arguments of a find call
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Document,
    pub sort: Option<Document>,
}

impl FindQuery {
    /// Query with `filter` that leaves the `_id` field out of results
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            projection: doc! { "_id": 0 },
            sort: None,
        }
    }

    /// Order results ascending by `field`
    #[must_use]
    pub fn sort_ascending(mut self, field: &str) -> Self {
        let mut sort = Document::new();
        sort.insert(field, 1);
        self.sort = Some(sort);
        self
    }
}

/// Counts reported by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCounts {
    pub matched: u64,
    pub modified: u64,
}

/// CRUD surface of a single collection
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document, returning its id rendered as a string
    async fn insert_one(&self, document: Document) -> Result<String, StoreError>;

    /// Insert documents, returning how many were inserted
    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize, StoreError>;

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError>;

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateCounts, StoreError>;

    async fn delete_many(&self, filter: Document) -> Result<u64, StoreError>;

    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError>;

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError>;

    /// Round-trip to the server, used by the readiness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
