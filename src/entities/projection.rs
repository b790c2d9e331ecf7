// Projections - read-only query results
//
// A projection carries a subset of a person's columns and no identity.
// Fields are private and there is no write path that accepts one, so a
// projected result can never be committed back.

use rusqlite::Row;
use serde::Serialize;

/// A read-only shape selected straight from the `people` table.
pub trait Projection: Sized {
    /// Column list placed in the `SELECT` clause.
    const COLUMNS: &'static str;

    /// Build the projection from a row holding exactly [`Self::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Only the age of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonAge {
    age: i64,
}

impl PersonAge {
    pub fn age(&self) -> i64 {
        self.age
    }
}

impl Projection for PersonAge {
    const COLUMNS: &'static str = "age";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PersonAge { age: row.get(0)? })
    }
}

/// Name and age for display, without identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    name: String,
    age: i64,
}

impl PersonSummary {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i64 {
        self.age
    }
}

impl Projection for PersonSummary {
    const COLUMNS: &'static str = "name, age";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PersonSummary {
            name: row.get(0)?,
            age: row.get(1)?,
        })
    }
}

impl std::fmt::Display for PersonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name: {}, Age: {}", self.name, self.age)
    }
}
