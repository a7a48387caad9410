//! Shell command parsing
//!
//! Turns a loosely structured, shell-like command string into a typed
//! [`Command`] in three steps:
//! - recognize the operation by keyword ([`Operation::recognize`])
//! - extract the embedded JSON blocks ([`BlockScanner`])
//! - decode them into BSON documents
//!
//! Nothing here talks to the database.

mod error;
mod operation;
mod scan;

pub use error::CommandError;
pub use operation::Operation;
use scan::{BlockScanner, Delimiter};

use bson::Document;
use serde_json::Value;

/// A recognized operation with its decoded arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertOne(Document),
    InsertMany(Vec<Document>),
    Find { filter: Document },
    UpdateOne { filter: Document, update: Document },
    DeleteMany { filter: Document },
    DeleteOne { filter: Document },
    CountDocuments { filter: Document },
    /// Ascending sort over the whole collection
    Sort { field: String },
}

/// Parse a raw command string
pub fn parse(input: &str) -> Result<Command, CommandError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(CommandError::Empty);
    }

    let operation = Operation::recognize(text).ok_or(CommandError::Unsupported)?;
    extract(operation, text)
}

/// Extract and decode the arguments of an already recognized operation
pub fn extract(operation: Operation, text: &str) -> Result<Command, CommandError> {
    match operation {
        Operation::InsertOne => Ok(Command::InsertOne(required_object(operation, text)?)),
        Operation::InsertMany => {
            let block = first_block(text, Delimiter::Bracket)?.ok_or(CommandError::MissingArray)?;
            Ok(Command::InsertMany(decode_array(block)?))
        }
        Operation::Find => Ok(Command::Find {
            filter: optional_object(text)?,
        }),
        Operation::UpdateOne => extract_update(text).map_err(|e| match e {
            e @ CommandError::TooFewBlocks { .. } => e,
            other => CommandError::UpdateOne(Box::new(other)),
        }),
        Operation::DeleteMany => Ok(Command::DeleteMany {
            filter: required_object(operation, text)?,
        }),
        Operation::DeleteOne => Ok(Command::DeleteOne {
            filter: required_object(operation, text)?,
        }),
        Operation::CountDocuments => Ok(Command::CountDocuments {
            filter: optional_object(text)?,
        }),
        Operation::Sort => {
            let spec = required_object(operation, text)?;
            // Only the field name matters; the direction value is ignored
            let field = spec
                .keys()
                .next()
                .filter(|key| !key.is_empty())
                .ok_or(CommandError::EmptySort)?;
            Ok(Command::Sort {
                field: field.clone(),
            })
        }
    }
}

fn extract_update(text: &str) -> Result<Command, CommandError> {
    let blocks = BlockScanner::new(text, Delimiter::Brace)
        .take(2)
        .collect::<Result<Vec<_>, _>>()?;

    let [filter, update] = blocks.as_slice() else {
        return Err(CommandError::TooFewBlocks {
            cleaned: clean(text),
        });
    };

    Ok(Command::UpdateOne {
        filter: decode_object(filter)?,
        update: decode_object(update)?,
    })
}

/// Flatten a command for display: newlines and parentheses become spaces
fn clean(text: &str) -> String {
    text.replace(['\n', '(', ')'], " ").trim().to_string()
}

fn first_block(text: &str, delimiter: Delimiter) -> Result<Option<&str>, CommandError> {
    Ok(BlockScanner::new(text, delimiter).next().transpose()?)
}

fn required_object(operation: Operation, text: &str) -> Result<Document, CommandError> {
    let block =
        first_block(text, Delimiter::Brace)?.ok_or(CommandError::MissingObject(operation))?;
    decode_object(block)
}

fn optional_object(text: &str) -> Result<Document, CommandError> {
    first_block(text, Delimiter::Brace)?.map_or_else(|| Ok(Document::new()), decode_object)
}

fn decode_object(block: &str) -> Result<Document, CommandError> {
    let value: Value = serde_json::from_str(block)?;
    into_document(value)
}

fn decode_array(block: &str) -> Result<Vec<Document>, CommandError> {
    let items = match serde_json::from_str(block)? {
        Value::Array(items) => items,
        other => return Err(CommandError::NotAnObject(json_kind(&other))),
    };
    if items.is_empty() {
        return Err(CommandError::EmptyArray);
    }
    items.into_iter().map(into_document).collect()
}

/// Convert a JSON object to BSON, honouring extended JSON such as `{"$oid": ...}`
fn into_document(value: Value) -> Result<Document, CommandError> {
    match value {
        Value::Object(map) => Ok(Document::try_from(map)?),
        other => Err(CommandError::NotAnObject(json_kind(&other))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
