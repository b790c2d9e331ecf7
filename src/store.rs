// Record store entry point.
//
// Store holds only its configuration. Every operation opens its own
// UnitOfWork (and therefore its own connection), so phases see each
// other's work only through committed state.

use crate::config::StoreConfig;
use crate::criteria::Criteria;
use crate::db;
use crate::entities::{Person, SEED_PEOPLE};
use crate::error::{Result, StoreError};
use crate::session::UnitOfWork;

#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Open (creating if needed) the database and its schema.
    ///
    /// Fails with [`StoreError::StorageUnavailable`] when the file cannot be
    /// opened or the schema cannot be created.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let conn = db::open(&config)?;
        db::setup_database(&conn).map_err(|e| StoreError::unavailable(&config.path, e))?;

        tracing::debug!(path = %config.path.display(), journal = config.journal_mode.as_str(), "store opened");
        Ok(Store { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Begin a fresh session on its own connection.
    pub fn unit_of_work(&self) -> Result<UnitOfWork> {
        Ok(UnitOfWork::begin(db::open(&self.config)?))
    }

    /// Insert the six sample people if the store holds no records.
    ///
    /// Returns how many were inserted (0 when already seeded).
    pub fn seed_if_empty(&self) -> Result<usize> {
        let mut uow = self.unit_of_work()?;
        if uow.any()? {
            tracing::debug!("store already seeded");
            return Ok(0);
        }

        for (name, age) in SEED_PEOPLE {
            uow.create(name, age);
        }
        let summary = uow.commit()?;

        tracing::info!(inserted = summary.inserted, "seeded empty store");
        Ok(summary.inserted)
    }

    /// Every persisted person, in insertion order.
    pub fn list_all(&self) -> Result<Vec<Person>> {
        let conn = db::open(&self.config)?;
        let rows = db::load_people(&conn, &Criteria::All)?;

        Ok(rows.into_iter().map(|row| row.person).collect())
    }
}
