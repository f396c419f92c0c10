//! Target list references and resolved handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Logical identifier for a target static list, as configured.
///
/// An all-digit string parses as a numeric ID; anything else is a list name.
/// Both forms must be resolved (and so verified) before mutations use them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListRef {
    Id(u64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListRefParseError {
    #[error("list reference cannot be empty")]
    Empty,

    #[error("list id '{0}' is out of range")]
    IdOutOfRange(String),
}

impl FromStr for ListRef {
    type Err = ListRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ListRefParseError::Empty);
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed
                .parse::<u64>()
                .map(ListRef::Id)
                .map_err(|_| ListRefParseError::IdOutOfRange(trimmed.to_string()));
        }
        Ok(ListRef::Name(trimmed.to_string()))
    }
}

impl fmt::Display for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListRef::Id(id) => write!(f, "#{}", id),
            ListRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// A static list as reported by the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticList {
    pub id: u64,
    pub name: String,
}

/// A list reference confirmed to exist on the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListHandle {
    reference: ListRef,
    id: u64,
    name: String,
}

impl ListHandle {
    pub fn new(reference: ListRef, list: StaticList) -> Self {
        Self {
            reference,
            id: list.id,
            name: list.name,
        }
    }

    pub fn reference(&self) -> &ListRef {
        &self.reference
    }

    /// Numeric ID used for membership mutations.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
