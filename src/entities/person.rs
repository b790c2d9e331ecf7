// Person entity - stable identity, mutable values
//
// The id is assigned once at creation and has no setter; name and age are
// plain public fields so a tracked entity can be edited in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable identity of a person (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(uuid::Uuid);

impl PersonId {
    /// Fresh random id
    pub fn new() -> Self {
        PersonId(uuid::Uuid::new_v4())
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PersonId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(PersonId)
    }
}

// ============================================================================
// PERSON ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    pub name: String,
    pub age: i64,
}

impl Person {
    /// Create a person with a newly assigned id
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Person {
            id: PersonId::new(),
            name: name.into(),
            age,
        }
    }

    /// Rebuild a person that already has an identity (loaded from storage)
    pub(crate) fn with_id(id: PersonId, name: String, age: i64) -> Self {
        Person { id, name, age }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}, Age: {}", self.name, self.age)
    }
}

// ============================================================================
// SEED DATA
// ============================================================================

/// The six records written into an empty store, in insertion order
pub const SEED_PEOPLE: [(&str, i64); 6] = [
    ("Willy", 33),
    ("Bob", 13),
    ("Harry", 47),
    ("Anna", 25),
    ("Jasmine", 64),
    ("Judy", 19),
];
