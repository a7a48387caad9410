// Command parsing errors
// Display text doubles as the message returned to the caller

use super::operation::Operation;
use super::scan::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No command provided.")]
    Empty,

    #[error("Unsupported or invalid command!")]
    Unsupported,

    /// Operation needs a `{...}` argument and none was found
    #[error("Invalid JSON in {0}")]
    MissingObject(Operation),

    #[error("Invalid JSON array in insertMany")]
    MissingArray,

    #[error("insertMany requires a non-empty array of documents")]
    EmptyArray,

    #[error("Could not find two JSON blocks in: {cleaned}")]
    TooFewBlocks { cleaned: String },

    /// Any other failure while preparing an update
    #[error("UpdateOne parse failed: {0}")]
    UpdateOne(Box<CommandError>),

    #[error("sort requires a field name")]
    EmptySort,

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ExtendedJson(#[from] bson::extjson::de::Error),
}
