// Response envelope
// Every /run reply is {"status": "success"|"error", "result": <message | documents>}

use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;

use super::{Outcome, RunError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Message(String),
    /// Documents rendered as relaxed extended JSON
    Documents(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub result: Payload,
}

impl Envelope {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            result: Payload::Message(message.into()),
        }
    }

    pub fn success(outcome: Outcome) -> Self {
        let result = match outcome {
            Outcome::Message(message) => Payload::Message(message),
            Outcome::Documents(documents) => {
                Payload::Documents(documents.into_iter().map(document_to_json).collect())
            }
        };
        Self {
            status: Status::Success,
            result,
        }
    }
}

impl From<Result<Outcome, RunError>> for Envelope {
    fn from(result: Result<Outcome, RunError>) -> Self {
        match result {
            Ok(outcome) => Self::success(outcome),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

fn document_to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}
