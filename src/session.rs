// Unit of work: identity map, change tracking and atomic commit.
//
// A UnitOfWork owns one connection. Entities it hands out are mutable
// borrows of its own identity map, so editing them in place is all a caller
// does; UnitOfWork::commit diffs every tracked entity against the
// snapshot it was loaded with and writes the changes in one SQLite
// transaction. Dropping the unit of work closes the connection and discards
// anything uncommitted.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::criteria::Criteria;
use crate::db::{self, PersonRow};
use crate::entities::{Person, PersonId, Projection};
use crate::error::{CommitError, Result};

/// Listing position: persisted rows by seq, then new entities by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    Stored(i64),
    Pending(u64),
}

#[derive(Debug)]
enum State {
    /// Created in this unit of work, not yet inserted
    New,
    /// Loaded from storage; `snapshot` is the last persisted value
    Loaded { snapshot: Person, version: i64 },
}

#[derive(Debug)]
struct Tracked {
    current: Person,
    state: State,
    position: Position,
}

impl Tracked {
    fn from_row(row: PersonRow) -> Self {
        Tracked {
            current: row.person.clone(),
            state: State::Loaded {
                snapshot: row.person,
                version: row.version,
            },
            position: Position::Stored(row.seq),
        }
    }

    fn is_dirty(&self) -> bool {
        match &self.state {
            State::New => true,
            State::Loaded { snapshot, .. } => *snapshot != self.current,
        }
    }
}

enum Written {
    Inserted { id: PersonId, seq: i64 },
    Updated { id: PersonId },
}

/// Summary of a successful commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl CommitSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// One transactional session against the store
#[derive(Debug)]
pub struct UnitOfWork {
    conn: Connection,
    tracked: HashMap<PersonId, Tracked>,
    next_pending: u64,
}

impl UnitOfWork {
    pub(crate) fn begin(conn: Connection) -> Self {
        UnitOfWork {
            conn,
            tracked: HashMap::new(),
            next_pending: 0,
        }
    }

    /// Number of persisted records (ignores pending inserts)
    pub fn count(&self) -> Result<i64> {
        db::count_people(&self.conn)
    }

    /// Whether any record is persisted
    pub fn any(&self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// Start tracking a new person; it is inserted on the next commit.
    pub fn create(&mut self, name: impl Into<String>, age: i64) -> &mut Person {
        let person = Person::new(name, age);
        let position = Position::Pending(self.next_pending);
        self.next_pending += 1;

        let entry = self.tracked.entry(person.id()).or_insert(Tracked {
            current: person,
            state: State::New,
            position,
        });
        &mut entry.current
    }

    /// Tracked entities matching `criteria`.
    ///
    /// Stored rows that match are loaded into the identity map; an entity
    /// already tracked keeps its in-memory values. The result is every
    /// tracked entity whose current values match, in listing order.
    pub fn query(&mut self, criteria: &Criteria) -> Result<Vec<&mut Person>> {
        let rows = db::load_people(&self.conn, criteria)?;
        tracing::debug!(loaded = rows.len(), ?criteria, "query");

        for row in rows {
            self.attach(row);
        }

        let mut matched: Vec<&mut Tracked> = self
            .tracked
            .values_mut()
            .filter(|t| criteria.matches(&t.current))
            .collect();
        matched.sort_by_key(|t| t.position);

        Ok(matched.into_iter().map(|t| &mut t.current).collect())
    }

    /// Tracked entity by identity; `None` if no such record exists.
    pub fn get(&mut self, id: PersonId) -> Result<Option<&mut Person>> {
        if !self.tracked.contains_key(&id) {
            match db::load_person(&self.conn, id)? {
                Some(row) => self.attach(row),
                None => return Ok(None),
            }
        }

        Ok(self.tracked.get_mut(&id).map(|t| &mut t.current))
    }

    /// Read-only projection of stored rows matching `criteria`.
    ///
    /// Reads persisted state only; projections are not tracked and cannot
    /// be committed.
    pub fn select<P: Projection>(&self, criteria: &Criteria) -> Result<Vec<P>> {
        db::select_projection(&self.conn, criteria)
    }

    /// Whether commit would write anything
    pub fn has_changes(&self) -> bool {
        self.tracked.values().any(Tracked::is_dirty)
    }

    fn attach(&mut self, row: PersonRow) {
        self.tracked
            .entry(row.person.id())
            .or_insert_with(|| Tracked::from_row(row));
    }

    /// Write every pending insert and update in one transaction.
    ///
    /// On error the transaction is rolled back, nothing is persisted and
    /// the tracked state is left as it was before the call.
    pub fn commit(&mut self) -> Result<CommitSummary> {
        let mut dirty: Vec<&Tracked> = self.tracked.values().filter(|t| t.is_dirty()).collect();
        if dirty.is_empty() {
            tracing::debug!("commit: nothing to write");
            return Ok(CommitSummary::default());
        }
        dirty.sort_by_key(|t| t.position);

        let tx = self.conn.transaction().map_err(CommitError::from)?;
        let mut written = Vec::with_capacity(dirty.len());

        for entry in dirty {
            let person = &entry.current;
            match &entry.state {
                State::New => {
                    let seq = db::insert_person(&tx, person).map_err(CommitError::from)?;
                    written.push(Written::Inserted { id: person.id(), seq });
                }
                State::Loaded { version, .. } => {
                    if !db::update_person(&tx, person, *version).map_err(CommitError::from)? {
                        tracing::warn!(id = %person.id(), version, "stale update, rolling back");
                        return Err(CommitError::Conflict { id: person.id() }.into());
                    }
                    written.push(Written::Updated { id: person.id() });
                }
            }
        }

        tx.commit().map_err(CommitError::from)?;

        let mut summary = CommitSummary::default();
        for write in written {
            match write {
                Written::Inserted { id, seq } => {
                    if let Some(entry) = self.tracked.get_mut(&id) {
                        entry.state = State::Loaded {
                            snapshot: entry.current.clone(),
                            version: 1,
                        };
                        entry.position = Position::Stored(seq);
                    }
                    summary.inserted += 1;
                }
                Written::Updated { id } => {
                    if let Some(entry) = self.tracked.get_mut(&id) {
                        if let State::Loaded { snapshot, version } = &mut entry.state {
                            *snapshot = entry.current.clone();
                            *version += 1;
                        }
                    }
                    summary.updated += 1;
                }
            }
        }

        tracing::info!(inserted = summary.inserted, updated = summary.updated, "committed");
        Ok(summary)
    }

    /// Discard pending changes and close the session.
    pub fn rollback(self) {
        let discarded = self.tracked.values().filter(|t| t.is_dirty()).count();
        tracing::debug!(discarded, "unit of work rolled back");
    }
}
