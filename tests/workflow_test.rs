// Integration tests for the seed -> query -> mutate -> commit -> list cycle
// Each session opens its own connection, so these run against a real file

use tempfile::TempDir;
use tracked_query::{
    workflow, Criteria, JournalMode, PersonAge, PersonSummary, Store, StoreConfig, StoreError,
};

fn open_store(dir: &TempDir) -> Store {
    Store::open(StoreConfig::new(dir.path().join("people.db"))).unwrap()
}

fn listing(store: &Store) -> Vec<(String, i64)> {
    store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.age))
        .collect()
}

fn pairs(expected: &[(&str, i64)]) -> Vec<(String, i64)> {
    expected.iter().map(|(n, a)| (n.to_string(), *a)).collect()
}

#[test]
fn test_full_run_produces_expected_listing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let people = workflow::run(&store).unwrap();
    let lines: Vec<String> = people.iter().map(|p| p.to_string()).collect();

    assert_eq!(
        lines,
        vec![
            "Name: Willy, Age: 46",
            "Name: Bob, Age: 13",
            "Name: Harry, Age: 60",
            "Name: Anna, Age: 25",
            "Name: Jasmine, Age: 77",
            "Name: Judy, Age: 19",
        ]
    );
}

#[test]
fn test_second_run_does_not_reseed() {
    let dir = TempDir::new().unwrap();
    workflow::run(&open_store(&dir)).unwrap();

    // Reopen the store as a new process would
    let store = open_store(&dir);
    let people = workflow::run(&store).unwrap();

    assert_eq!(people.len(), 6);
    assert_eq!(
        listing(&store),
        pairs(&[
            ("Willy", 59),
            ("Bob", 13),
            ("Harry", 73),
            ("Anna", 25),
            ("Jasmine", 90),
            ("Judy", 19),
        ])
    );
}

#[test]
fn test_filter_before_mutation() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    let mut uow = store.unit_of_work().unwrap();
    let found: Vec<(String, i64)> = uow
        .query(&Criteria::age_greater_than(30))
        .unwrap()
        .iter()
        .map(|p| (p.name.clone(), p.age))
        .collect();

    assert_eq!(found, pairs(&[("Willy", 33), ("Harry", 47), ("Jasmine", 64)]));
}

#[test]
fn test_write_back_by_identity_in_new_session() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    let mut uow = store.unit_of_work().unwrap();
    let mut expected = Vec::new();
    for person in uow.query(&Criteria::age_greater_than(30)).unwrap() {
        person.age += 13;
        expected.push((person.id(), person.age));
    }
    uow.commit().unwrap();
    drop(uow);

    let mut fresh = store.unit_of_work().unwrap();
    for (id, age) in expected {
        let person = fresh.get(id).unwrap().expect("updated person still exists");
        assert_eq!(person.age, age, "Committed age should be visible for {}", id);
    }
}

#[test]
fn test_uncommitted_changes_are_discarded() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    let mut uow = store.unit_of_work().unwrap();
    for person in uow.query(&Criteria::All).unwrap() {
        person.age = 0;
    }
    uow.create("Ghost", 99);
    uow.rollback();

    assert_eq!(
        listing(&store),
        pairs(&[
            ("Willy", 33),
            ("Bob", 13),
            ("Harry", 47),
            ("Anna", 25),
            ("Jasmine", 64),
            ("Judy", 19),
        ])
    );
}

#[test]
fn test_conflicting_commit_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    // Two sessions load the same people
    let mut first = store.unit_of_work().unwrap();
    let mut second = store.unit_of_work().unwrap();
    first.query(&Criteria::name_equals("Harry")).unwrap();
    let second_batch = second.query(&Criteria::age_greater_than(30)).unwrap();
    for person in second_batch {
        person.age += 100;
    }
    second.create("Newcomer", 5);

    // First session commits Harry first
    for person in first.query(&Criteria::name_equals("Harry")).unwrap() {
        person.age = 48;
    }
    first.commit().unwrap();

    // Second commit touches Willy (fine), Harry (stale) and inserts Newcomer
    let err = second.commit().unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {}", err);
    drop(second);

    assert_eq!(
        listing(&store),
        pairs(&[
            ("Willy", 33),
            ("Bob", 13),
            ("Harry", 48),
            ("Anna", 25),
            ("Jasmine", 64),
            ("Judy", 19),
        ]),
        "None of the failed commit's writes may be visible"
    );
}

#[test]
fn test_projection_reads_without_tracking() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    let mut uow = store.unit_of_work().unwrap();
    let ages: Vec<i64> = uow
        .select::<PersonAge>(&Criteria::age_greater_than(30))
        .unwrap()
        .iter()
        .map(PersonAge::age)
        .collect();
    assert_eq!(ages, vec![33, 47, 64]);

    let summaries = uow.select::<PersonSummary>(&Criteria::age_less_than(20)).unwrap();
    let names: Vec<&str> = summaries.iter().map(PersonSummary::name).collect();
    assert_eq!(names, vec!["Bob", "Judy"]);

    // Selecting projections leaves nothing to commit
    assert!(!uow.has_changes());
    assert_eq!(uow.commit().unwrap().total(), 0);
}

#[test]
fn test_delete_journal_mode_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path().join("people.db")).with_journal_mode(JournalMode::Delete);
    let store = Store::open(config).unwrap();

    workflow::run(&store).unwrap();

    assert_eq!(listing(&store).len(), 6);
}

#[test]
fn test_age_overflow_aborts_without_commit() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.seed_if_empty().unwrap();

    let mut uow = store.unit_of_work().unwrap();
    let max_id = uow.create("Max", i64::MAX - 5).id();
    uow.commit().unwrap();
    drop(uow);

    let err = workflow::run(&store).unwrap_err();
    match err {
        StoreError::AgeOverflow { id, years } => {
            assert_eq!(id, max_id);
            assert_eq!(years, workflow::AGE_INCREMENT);
        }
        other => panic!("expected AgeOverflow, got {}", other),
    }

    // Willy, Harry and Jasmine were bumped in memory first; none of it may stick
    assert_eq!(
        listing(&store),
        pairs(&[
            ("Willy", 33),
            ("Bob", 13),
            ("Harry", 47),
            ("Anna", 25),
            ("Jasmine", 64),
            ("Judy", 19),
            ("Max", i64::MAX - 5),
        ])
    );
}
