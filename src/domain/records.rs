//! Entity records and request payloads
//!
//! Field names follow the JSON the API has always exchanged
//! (`book_id`, `user_type`, ...), so these types serialize as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of entity managed by the service. Used to namespace cache keys and
/// to tag audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Lecturer,
    Library,
    Loan,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Lecturer => "lecturer",
            EntityKind::Library => "library",
            EntityKind::Loan => "loan",
        }
    }

    /// Cache key for an entity of this kind: `"{kind}:{id}"`.
    pub fn cache_key(&self, id: i32) -> String {
        format!("{}:{}", self.as_str(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who holds a loan. Stored as its lowercase name in `borrow_records.user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowerKind {
    Student,
    Lecturer,
}

impl BorrowerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowerKind::Student => "student",
            BorrowerKind::Lecturer => "lecturer",
        }
    }
}

impl FromStr for BorrowerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(BorrowerKind::Student),
            "lecturer" => Ok(BorrowerKind::Lecturer),
            other => Err(format!(
                "invalid user_type '{}', must be 'student' or 'lecturer'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    /// Free-text year of study
    pub year: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub age: i32,
    pub email: String,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub designation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LecturerInput {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub designation: String,
}

/// A catalogued book and how many copies are on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub book_id: i32,
    pub book_name: String,
    pub title: String,
    pub author: String,
    pub available_copies: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryItemInput {
    pub book_name: String,
    pub title: String,
    pub author: String,
    pub available_copies: i32,
}

/// One borrow of one book. `return_date == None` means the loan is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub borrow_id: i32,
    pub user_id: i32,
    pub user_type: String,
    pub book_id: i32,
    pub borrow_date: String,
    pub return_date: Option<String>,
}

/// Borrow or return request. Dates are optional and only checked for ordering
/// when both are supplied; the store stamps the real ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanRequest {
    #[serde(default)]
    pub user_id: i32,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub book_id: i32,
    #[serde(default)]
    pub borrow_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
}

/// Row of the borrowing history: a loan joined with its book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanHistoryEntry {
    pub borrow_id: i32,
    pub user_id: i32,
    pub user_type: String,
    pub book_id: i32,
    pub book_name: String,
    pub borrow_date: String,
    pub return_date: Option<String>,
}
