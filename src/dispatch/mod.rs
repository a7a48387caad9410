//! Command dispatch
//!
//! Runs a parsed [`Command`] against a [`DocumentStore`] and turns the result
//! into an [`Outcome`]. [`run`] chains parsing and execution for the HTTP
//! handler; every failure comes back as a [`RunError`] whose text is the
//! message shown to the caller.

mod envelope;

pub use envelope::{Envelope, Status};

use bson::Document;

use crate::command::{self, Command, CommandError};
use crate::store::{DocumentStore, FindQuery, StoreError};

/// Successful result of a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Message(String),
    Documents(Vec<Document>),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("UpdateOne parse failed: {0}")]
    Update(StoreError),

    #[error(transparent)]
    Store(StoreError),
}

/// Parse `raw` and execute it
pub async fn run(raw: &str, store: &dyn DocumentStore) -> Result<Outcome, RunError> {
    let command = command::parse(raw)?;
    execute(command, store).await
}

/// Execute a parsed command
pub async fn execute(command: Command, store: &dyn DocumentStore) -> Result<Outcome, RunError> {
    let outcome = match command {
        Command::InsertOne(document) => {
            let id = store.insert_one(document).await.map_err(RunError::Store)?;
            Outcome::Message(format!("Inserted ID: {id}"))
        }
        Command::InsertMany(documents) => {
            let count = store.insert_many(documents).await.map_err(RunError::Store)?;
            Outcome::Message(format!("Inserted {count} documents"))
        }
        Command::Find { filter } => {
            let documents = store
                .find(FindQuery::new(filter))
                .await
                .map_err(RunError::Store)?;
            Outcome::Documents(documents)
        }
        Command::UpdateOne { filter, update } => {
            let counts = store
                .update_one(filter, update)
                .await
                .map_err(RunError::Update)?;
            Outcome::Message(format!(
                "Matched: {}, Modified: {}",
                counts.matched, counts.modified
            ))
        }
        Command::DeleteMany { filter } => {
            let deleted = store.delete_many(filter).await.map_err(RunError::Store)?;
            Outcome::Message(format!("Deleted {deleted} documents"))
        }
        Command::DeleteOne { filter } => {
            let deleted = store.delete_one(filter).await.map_err(RunError::Store)?;
            Outcome::Message(format!("Deleted {deleted} document"))
        }
        Command::CountDocuments { filter } => {
            let count = store
                .count_documents(filter)
                .await
                .map_err(RunError::Store)?;
            Outcome::Message(format!("Total documents: {count}"))
        }
        Command::Sort { field } => {
            let query = FindQuery::new(Document::new()).sort_ascending(&field);
            let documents = store.find(query).await.map_err(RunError::Store)?;
            Outcome::Documents(documents)
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{Call, RecordingStore};
    use bson::doc;

    #[tokio::test]
    async fn test_insert_one_passes_document_unchanged() {
        let store = RecordingStore::default();
        let outcome = run(r#"db.trains.insertOne({"name": "Express", "seats": 120})"#, &store)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Message("Inserted ID: 65a1f0c2e4b0a1b2c3d4e5f6".to_string())
        );
        assert_eq!(
            store.calls(),
            vec![Call::InsertOne(doc! { "name": "Express", "seats": 120 })]
        );
    }

    #[tokio::test]
    async fn test_insert_many_reports_count() {
        let store = RecordingStore::default();
        let outcome = run(r#"db.trains.insertMany([{"n": 1}, {"n": 2}])"#, &store)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Message("Inserted 2 documents".to_string()));
    }

    #[tokio::test]
    async fn test_find_without_filter_excludes_id() {
        let store = RecordingStore::with_documents(vec![doc! { "name": "Express" }]);
        let outcome = run("db.trains.find()", &store).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Documents(vec![doc! { "name": "Express" }])
        );
        assert_eq!(
            store.calls(),
            vec![Call::Find(FindQuery {
                filter: Document::new(),
                projection: doc! { "_id": 0 },
                sort: None,
            })]
        );
    }

    #[tokio::test]
    async fn test_update_one_uses_filter_then_update() {
        let store = RecordingStore::default();
        let outcome = run(
            "db.trains.updateOne({\"name\": \"Express\"},\n\n   {\"$set\": {\"seats\": 90}})",
            &store,
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::Message("Matched: 1, Modified: 1".to_string()));
        assert_eq!(
            store.calls(),
            vec![Call::UpdateOne(
                doc! { "name": "Express" },
                doc! { "$set": { "seats": 90 } }
            )]
        );
    }

    #[tokio::test]
    async fn test_update_one_single_block_touches_nothing() {
        let store = RecordingStore::default();
        let err = run(r#"db.trains.updateOne({"name": "Express"})"#, &store)
            .await
            .unwrap_err();

        assert!(err.to_string().contains(r#"db.trains.updateOne {"name": "Express"}"#));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_one_store_failure_is_prefixed() {
        let store = RecordingStore::failing("update document requires atomic operators");
        let err = run(r#"updateOne({"a": 1}, {"b": 2})"#, &store)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "UpdateOne parse failed: update document requires atomic operators"
        );
    }

    #[tokio::test]
    async fn test_delete_messages() {
        let store = RecordingStore::default();
        let many = run(r#"db.trains.deleteMany({"active": false})"#, &store)
            .await
            .unwrap();
        let one = run(r#"db.trains.deleteOne({"name": "Old"})"#, &store)
            .await
            .unwrap();

        assert_eq!(many, Outcome::Message("Deleted 3 documents".to_string()));
        assert_eq!(one, Outcome::Message("Deleted 1 document".to_string()));
        assert_eq!(
            store.calls(),
            vec![
                Call::DeleteMany(doc! { "active": false }),
                Call::DeleteOne(doc! { "name": "Old" }),
            ]
        );
    }

    #[tokio::test]
    async fn test_count_documents() {
        let store = RecordingStore::with_documents(vec![doc! {}, doc! {}]);
        let outcome = run("db.trains.countDocuments()", &store).await.unwrap();
        assert_eq!(outcome, Outcome::Message("Total documents: 2".to_string()));
        assert_eq!(store.calls(), vec![Call::CountDocuments(Document::new())]);
    }

    #[tokio::test]
    async fn test_sort_is_always_ascending() {
        let store = RecordingStore::default();
        run(r#"sort({"age": -1})"#, &store).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![Call::Find(FindQuery {
                filter: Document::new(),
                projection: doc! { "_id": 0 },
                sort: Some(doc! { "age": 1 }),
            })]
        );
    }

    #[tokio::test]
    async fn test_unsupported_command_never_reaches_store() {
        let store = RecordingStore::default();
        let err = run("db.trains.aggregate([])", &store).await.unwrap_err();

        assert_eq!(err.to_string(), "Unsupported or invalid command!");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let store = RecordingStore::default();
        let err = run(r#"db.trains.deleteMany({"a": )"#, &store).await.unwrap_err();
        assert!(matches!(err, RunError::Command(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_message() {
        let store = RecordingStore::failing("connection refused");
        let err = run("db.trains.countDocuments()", &store).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
