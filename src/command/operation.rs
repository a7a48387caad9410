//! Operation recognition
//!
//! Picks the operation a shell command asks for by case-insensitive keyword
//! containment. Keywords are tried in a fixed priority order and the first hit
//! wins, so `db.c.find().sort({...})` is a `find`.

use std::fmt;

/// The eight operations the server knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InsertOne,
    InsertMany,
    Find,
    UpdateOne,
    DeleteMany,
    DeleteOne,
    CountDocuments,
    Sort,
}

impl Operation {
    /// All operations in recognition priority order
    pub const ALL: [Self; 8] = [
        Self::InsertOne,
        Self::InsertMany,
        Self::Find,
        Self::UpdateOne,
        Self::DeleteMany,
        Self::DeleteOne,
        Self::CountDocuments,
        Self::Sort,
    ];

    /// Lower-case keyword searched for in the command text
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::InsertOne => "insertone",
            Self::InsertMany => "insertmany",
            Self::Find => "find",
            Self::UpdateOne => "updateone",
            Self::DeleteMany => "deletemany",
            Self::DeleteOne => "deleteone",
            Self::CountDocuments => "countdocuments",
            Self::Sort => "sort",
        }
    }

    /// Shell spelling, used in messages and logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::InsertOne => "insertOne",
            Self::InsertMany => "insertMany",
            Self::Find => "find",
            Self::UpdateOne => "updateOne",
            Self::DeleteMany => "deleteMany",
            Self::DeleteOne => "deleteOne",
            Self::CountDocuments => "countDocuments",
            Self::Sort => "sort",
        }
    }

    /// Recognize the operation named anywhere in `text`
    pub fn recognize(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| lowered.contains(op.keyword()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_is_case_insensitive() {
        assert_eq!(
            Operation::recognize(r#"db.trains.InsertOne({"a": 1})"#),
            Some(Operation::InsertOne)
        );
        assert_eq!(
            Operation::recognize("DB.TRAINS.COUNTDOCUMENTS()"),
            Some(Operation::CountDocuments)
        );
    }

    #[test]
    fn test_recognize_priority_order() {
        // find is checked before sort
        assert_eq!(
            Operation::recognize(r#"db.trains.find().sort({"age": 1})"#),
            Some(Operation::Find)
        );
        // deletemany is checked before deleteone
        assert_eq!(
            Operation::recognize("deleteMany deleteOne"),
            Some(Operation::DeleteMany)
        );
        assert_eq!(
            Operation::recognize(r#"db.trains.sort({"age": 1})"#),
            Some(Operation::Sort)
        );
    }

    #[test]
    fn test_recognize_has_no_word_boundaries() {
        // Substring containment only: "findings" still contains "find"
        assert_eq!(
            Operation::recognize("db.findings.updateOne({}, {})"),
            Some(Operation::Find)
        );
    }

    #[test]
    fn test_recognize_unknown() {
        assert_eq!(Operation::recognize("db.trains.drop()"), None);
        assert_eq!(Operation::recognize(""), None);
    }

    #[test]
    fn test_display_uses_shell_name() {
        assert_eq!(Operation::UpdateOne.to_string(), "updateOne");
        assert_eq!(Operation::CountDocuments.to_string(), "countDocuments");
    }
}
