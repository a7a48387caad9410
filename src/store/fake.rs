// Recording in-memory store for tests

use async_trait::async_trait;
use bson::Document;
use std::sync::Mutex;

use super::{DocumentStore, FindQuery, StoreError, UpdateCounts};

/// A call the store received, with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InsertOne(Document),
    InsertMany(Vec<Document>),
    Find(FindQuery),
    UpdateOne(Document, Document),
    DeleteMany(Document),
    DeleteOne(Document),
    CountDocuments(Document),
    Ping,
}

/// Records every call and answers with canned results
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<Call>>,
    pub documents: Vec<Document>,
    pub fail_with: Option<String>,
}

impl RecordingStore {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn insert_one(&self, document: Document) -> Result<String, StoreError> {
        self.record(Call::InsertOne(document))?;
        Ok("65a1f0c2e4b0a1b2c3d4e5f6".to_string())
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        let count = documents.len();
        self.record(Call::InsertMany(documents))?;
        Ok(count)
    }

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError> {
        self.record(Call::Find(query))?;
        Ok(self.documents.clone())
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateCounts, StoreError> {
        self.record(Call::UpdateOne(filter, update))?;
        Ok(UpdateCounts {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_many(&self, filter: Document) -> Result<u64, StoreError> {
        self.record(Call::DeleteMany(filter))?;
        Ok(3)
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError> {
        self.record(Call::DeleteOne(filter))?;
        Ok(1)
    }

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError> {
        self.record(Call::CountDocuments(filter))?;
        Ok(self.documents.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.record(Call::Ping)
    }
}
