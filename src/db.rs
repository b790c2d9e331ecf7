use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::config::StoreConfig;
use crate::criteria::Criteria;
use crate::entities::{Person, PersonId, Projection};
use crate::error::{Result, StoreError};

/// A person as stored, with the optimistic-lock version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    /// Insertion order (autoincrement rowid)
    pub seq: i64,
    pub person: Person,
    pub version: i64,
}

/// Open a connection and apply the configured pragmas
pub fn open(config: &StoreConfig) -> Result<Connection> {
    let conn = Connection::open(&config.path)
        .map_err(|e| StoreError::unavailable(&config.path, e))?;

    configure(&conn, config).map_err(|e| StoreError::unavailable(&config.path, e))?;

    Ok(conn)
}

fn configure(conn: &Connection, config: &StoreConfig) -> rusqlite::Result<()> {
    conn.busy_timeout(config.busy_timeout)?;
    conn.pragma_update(None, "journal_mode", config.journal_mode.as_str())?;
    Ok(())
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // ==========================================================================
    // People Table
    // seq orders listings, person_id is the stable identity,
    // version is bumped on every committed update
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS people (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_people_age ON people(age)",
        [],
    )?;

    Ok(())
}

pub fn count_people(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;

    Ok(count)
}

/// Load every stored person matching `criteria`, in insertion order
pub fn load_people(conn: &Connection, criteria: &Criteria) -> Result<Vec<PersonRow>> {
    let (clause, values) = criteria.to_sql();
    let mut stmt = conn.prepare(&format!(
        "SELECT seq, person_id, name, age, version
         FROM people
         WHERE {}
         ORDER BY seq",
        clause
    ))?;

    let raw = stmt
        .query_map(params_from_iter(values), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.into_iter()
        .map(|(seq, id, name, age, version)| decode_row(seq, &id, name, age, version))
        .collect()
}

/// Load a single person by identity
pub fn load_person(conn: &Connection, id: PersonId) -> Result<Option<PersonRow>> {
    let raw = conn
        .query_row(
            "SELECT seq, person_id, name, age, version FROM people WHERE person_id = ?1",
            [id.to_string()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()?;

    raw.map(|(seq, id, name, age, version)| decode_row(seq, &id, name, age, version))
        .transpose()
}

fn decode_row(seq: i64, id: &str, name: String, age: i64, version: i64) -> Result<PersonRow> {
    let id: PersonId = id
        .parse()
        .map_err(|e| StoreError::CorruptRow(format!("person_id {:?} at seq {}: {}", id, seq, e)))?;

    Ok(PersonRow {
        seq,
        person: Person::with_id(id, name, age),
        version,
    })
}

/// Select a read-only projection of every person matching `criteria`
pub fn select_projection<P: Projection>(conn: &Connection, criteria: &Criteria) -> Result<Vec<P>> {
    let (clause, values) = criteria.to_sql();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM people WHERE {} ORDER BY seq",
        P::COLUMNS,
        clause
    ))?;

    let rows = stmt
        .query_map(params_from_iter(values), |row| P::from_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Insert a new person at version 1, returning its seq
pub fn insert_person(conn: &Connection, person: &Person) -> rusqlite::Result<i64> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO people (person_id, name, age, version, created_at, updated_at)
         VALUES (?1, ?2, ?3, 1, ?4, ?4)",
        params![person.id().to_string(), person.name, person.age, now],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Write a person's values if the stored row is still at `expected_version`.
///
/// Returns false when no row matched, i.e. someone else committed first
/// (or the row is gone).
pub fn update_person(conn: &Connection, person: &Person, expected_version: i64) -> rusqlite::Result<bool> {
    let now = Utc::now().to_rfc3339();

    let changed = conn.execute(
        "UPDATE people
         SET name = ?1,
             age = ?2,
             version = version + 1,
             updated_at = ?3
         WHERE person_id = ?4 AND version = ?5",
        params![
            person.name,
            person.age,
            now,
            person.id().to_string(),
            expected_version
        ],
    )?;

    Ok(changed == 1)
}
