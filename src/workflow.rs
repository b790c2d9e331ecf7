// The demonstration run: seed, bump ages of the over-thirties, list.

use crate::criteria::Criteria;
use crate::entities::Person;
use crate::error::{Result, StoreError};
use crate::store::Store;

/// People strictly older than this get updated.
pub const AGE_THRESHOLD: i64 = 30;

/// Years added to each matching person.
pub const AGE_INCREMENT: i64 = 13;

/// Add `years` to the age of everyone matching `criteria`, in one commit.
///
/// Returns how many people were updated. If any new age would overflow
/// i64 the run stops with [`StoreError::AgeOverflow`] before committing, so
/// no age is changed.
pub fn increment_ages(store: &Store, criteria: &Criteria, years: i64) -> Result<usize> {
    let mut uow = store.unit_of_work()?;

    for person in uow.query(criteria)? {
        person.age = person
            .age
            .checked_add(years)
            .ok_or(StoreError::AgeOverflow { id: person.id(), years })?;
    }

    Ok(uow.commit()?.updated)
}

/// Seed if empty, age everyone over [`AGE_THRESHOLD`] by [`AGE_INCREMENT`],
/// then return the full listing from a fresh session.
pub fn run(store: &Store) -> Result<Vec<Person>> {
    store.seed_if_empty()?;

    let updated = increment_ages(
        store,
        &Criteria::age_greater_than(AGE_THRESHOLD),
        AGE_INCREMENT,
    )?;
    tracing::info!(updated, threshold = AGE_THRESHOLD, years = AGE_INCREMENT, "ages incremented");

    store.list_all()
}
