//! MongoDB-backed store
//!
//! One client per process; the driver pools connections internally.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::future::IntoFuture;
use std::time::Duration;

use super::{DocumentStore, FindQuery, StoreError, UpdateCounts};
use crate::config::StoreConfig;

pub struct MongoStore {
    database: Database,
    collection: Collection<Document>,
    ping_timeout: Duration,
}

impl MongoStore {
    /// Build the client from configuration
    ///
    /// The driver connects lazily, so this only fails on an invalid URI or
    /// options; an unreachable server shows up on the first operation.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let collection = database.collection::<Document>(&config.collection);

        Ok(Self {
            database,
            collection,
            ping_timeout: Duration::from_secs(config.server_selection_timeout),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, document: Document) -> Result<String, StoreError> {
        let result = self.collection.insert_one(document).await?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        let result = self.collection.insert_many(documents).await?;
        Ok(result.inserted_ids.len())
    }

    async fn find(&self, query: FindQuery) -> Result<Vec<Document>, StoreError> {
        let mut action = self
            .collection
            .find(query.filter)
            .projection(query.projection);
        if let Some(sort) = query.sort {
            action = action.sort(sort);
        }
        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateCounts, StoreError> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_many(&self, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection.delete_many(filter).await?.deleted_count)
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection.delete_one(filter).await?.deleted_count)
    }

    async fn count_documents(&self, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(filter).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let ping = self.database.run_command(doc! { "ping": 1 }).into_future();
        match tokio::time::timeout(self.ping_timeout, ping).await {
            Ok(reply) => reply.map(|_| ()).map_err(StoreError::from),
            Err(_) => Err(StoreError::Unavailable(format!(
                "Ping timed out after {} seconds",
                self.ping_timeout.as_secs()
            ))),
        }
    }
}

/// Render an inserted id the way the shell prints it: bare hex for `ObjectId`
fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
